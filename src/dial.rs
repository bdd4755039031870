use log::debug;
use std::time::{Duration, Instant};

const NUDGE_COOLDOWN: Duration = Duration::from_millis(300);

/// Feedback pulses for the haptic side channel: `Tick` when the live
/// preview crosses into a new sector mid-drag, `Confirm` when a view
/// commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pulse {
    Tick,
    Confirm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialEvent {
    pub sector: usize,
    pub pulse: Pulse,
}

/// Maps a continuous circular drag onto one of N equally spaced sectors.
/// During a drag the sector is a live preview; the view only commits on
/// release, when the rotation also snaps to an exact sector multiple.
/// Wheel-style discrete navigation bypasses the angle math entirely and
/// is rate-limited by a cooldown window.
#[derive(Debug)]
pub struct Dial {
    sectors: usize,
    current_index: usize,
    rotation: f64,
    dragging: bool,
    last_sector: usize,
    start_angle: f64,
    last_nudge: Option<Instant>,
}

impl Dial {
    pub fn new(sectors: usize) -> Self {
        assert!(sectors > 0, "dial needs at least one sector");
        Dial {
            sectors,
            current_index: 0,
            rotation: 0.0,
            dragging: false,
            last_sector: 0,
            start_angle: 0.0,
            last_nudge: None,
        }
    }

    pub fn step(&self) -> f64 {
        360.0 / self.sectors as f64
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn dragging(&self) -> bool {
        self.dragging
    }

    pub fn begin_drag(&mut self, center: (f64, f64), pointer: (f64, f64)) {
        self.start_angle = pointer_angle(center, pointer) - self.rotation;
        self.dragging = true;
        self.last_sector = self.sector_for(self.rotation);
    }

    /// Live preview path: returns a tick event whenever the drag crosses
    /// into a new sector, without committing anything.
    pub fn drag_to(&mut self, center: (f64, f64), pointer: (f64, f64)) -> Option<DialEvent> {
        if !self.dragging {
            return None;
        }
        self.rotation = pointer_angle(center, pointer) - self.start_angle;
        let sector = self.sector_for(self.rotation);
        if sector == self.last_sector {
            return None;
        }
        self.last_sector = sector;
        Some(DialEvent {
            sector,
            pulse: Pulse::Tick,
        })
    }

    /// Commit path for pointer up and pointer cancel alike: the sector
    /// under the final rotation becomes the current view and the rotation
    /// snaps to its exact angle.
    pub fn end_drag(&mut self) -> Option<DialEvent> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;
        let sector = self.sector_for(self.rotation);
        self.commit(sector);
        debug!("dial committed sector {sector}");
        Some(DialEvent {
            sector,
            pulse: Pulse::Confirm,
        })
    }

    /// Discrete navigation: one step forward or back, committed
    /// immediately. Events inside the cooldown window are discarded so a
    /// single input burst cannot turn several pages.
    pub fn nudge(&mut self, delta: i64) -> Option<DialEvent> {
        if let Some(last) = self.last_nudge {
            if last.elapsed() < NUDGE_COOLDOWN {
                return None;
            }
        }
        self.last_nudge = Some(Instant::now());
        let next = (self.current_index as i64 + delta).rem_euclid(self.sectors as i64) as usize;
        self.commit(next);
        Some(DialEvent {
            sector: next,
            pulse: Pulse::Confirm,
        })
    }

    pub fn select(&mut self, index: usize) -> DialEvent {
        let sector = index % self.sectors;
        self.commit(sector);
        DialEvent {
            sector,
            pulse: Pulse::Confirm,
        }
    }

    fn commit(&mut self, sector: usize) {
        self.current_index = sector;
        self.rotation = sector as f64 * self.step();
        self.last_sector = sector;
    }

    fn sector_for(&self, rotation: f64) -> usize {
        let raw = (rotation / self.step()).round() as i64;
        raw.rem_euclid(self.sectors as i64) as usize
    }
}

fn pointer_angle(center: (f64, f64), pointer: (f64, f64)) -> f64 {
    (pointer.1 - center.1).atan2(pointer.0 - center.0).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: (f64, f64) = (0.0, 0.0);

    fn point_at(degrees: f64) -> (f64, f64) {
        let radians = degrees.to_radians();
        (radians.cos(), radians.sin())
    }

    #[test]
    fn drag_ending_at_127_degrees_commits_sector_2_and_snaps_to_120() {
        let mut dial = Dial::new(6);
        dial.begin_drag(CENTER, point_at(0.0));
        dial.drag_to(CENTER, point_at(127.0));
        assert!((dial.rotation() - 127.0).abs() < 1e-9);

        let event = dial.end_drag().unwrap();
        assert_eq!(event.sector, 2);
        assert_eq!(event.pulse, Pulse::Confirm);
        assert_eq!(dial.current_index(), 2);
        assert_eq!(dial.rotation(), 120.0);
        assert_eq!(dial.rotation() % dial.step(), 0.0);
    }

    #[test]
    fn negative_rotation_wraps_to_a_valid_sector() {
        let mut dial = Dial::new(6);
        dial.begin_drag(CENTER, point_at(0.0));
        dial.drag_to(CENTER, point_at(-127.0));
        let event = dial.end_drag().unwrap();
        assert_eq!(event.sector, 4);
        assert_eq!(dial.rotation(), 240.0);
    }

    #[test]
    fn crossing_sectors_mid_drag_previews_without_committing() {
        let mut dial = Dial::new(6);
        dial.begin_drag(CENTER, point_at(0.0));

        assert!(dial.drag_to(CENTER, point_at(10.0)).is_none());
        let tick = dial.drag_to(CENTER, point_at(40.0)).unwrap();
        assert_eq!(tick.sector, 1);
        assert_eq!(tick.pulse, Pulse::Tick);
        assert!(dial.drag_to(CENTER, point_at(50.0)).is_none());
        assert_eq!(dial.current_index(), 0);
    }

    #[test]
    fn drag_start_keeps_rotation_continuous() {
        let mut dial = Dial::new(6);
        dial.select(2);
        assert_eq!(dial.rotation(), 120.0);

        // Grabbing the dial anywhere must not jerk the ring.
        dial.begin_drag(CENTER, point_at(30.0));
        dial.drag_to(CENTER, point_at(35.0));
        assert!((dial.rotation() - 125.0).abs() < 1e-9);
    }

    #[test]
    fn nudge_wraps_both_directions() {
        let mut dial = Dial::new(6);
        let event = dial.nudge(-1).unwrap();
        assert_eq!(event.sector, 5);

        dial.last_nudge = None;
        let event = dial.nudge(1).unwrap();
        assert_eq!(event.sector, 0);
        assert_eq!(dial.rotation(), 0.0);
    }

    #[test]
    fn nudges_inside_cooldown_are_discarded() {
        let mut dial = Dial::new(6);
        assert!(dial.nudge(1).is_some());
        assert!(dial.nudge(1).is_none());
        assert_eq!(dial.current_index(), 1);

        dial.last_nudge = Some(Instant::now() - Duration::from_millis(301));
        assert!(dial.nudge(1).is_some());
        assert_eq!(dial.current_index(), 2);
    }

    #[test]
    fn select_wraps_out_of_range_indexes() {
        let mut dial = Dial::new(6);
        let event = dial.select(8);
        assert_eq!(event.sector, 2);
        assert_eq!(dial.rotation(), 120.0);
    }
}
