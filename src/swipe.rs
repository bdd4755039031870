use log::debug;

const DEADZONE: f32 = 8.0;
const TAP_SLOP: f32 = 6.0;
const COMMIT_FRACTION: f32 = 0.55;
const MAX_OFFSET: f32 = 220.0;
const MAX_OFFSET_FRACTION: f32 = 0.9;
const SETTLE_FRACTION: f32 = 0.34;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipePhase {
    Idle,
    Tracking,
    LockedHorizontal,
    LockedVertical,
    Settling,
}

/// What a finished gesture amounts to. `Commit` means the recognizer has
/// entered its settle phase; the completion callback belongs after
/// `settle_tick` reports done, not here. `Cancel` carries the offset the
/// row had at release time so callers can tell a tap from an aborted drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SwipeOutcome {
    Commit,
    Cancel { offset: f32 },
}

impl SwipeOutcome {
    pub fn is_tap(&self) -> bool {
        matches!(self, SwipeOutcome::Cancel { offset } if offset.abs() < TAP_SLOP)
    }
}

/// Turns one row's pointer stream into a commit or cancel decision.
/// Direction is locked once movement leaves the deadzone: a vertical lock
/// abandons the gesture as a scroll, a horizontal lock accepts leftward
/// displacement only, clamped so the row cannot overshoot.
#[derive(Debug)]
pub struct SwipeGesture {
    phase: SwipePhase,
    origin_x: f32,
    origin_y: f32,
    offset_x: f32,
    row_width: f32,
}

impl SwipeGesture {
    pub fn begin(x: f32, y: f32, row_width: f32) -> Self {
        SwipeGesture {
            phase: SwipePhase::Tracking,
            origin_x: x,
            origin_y: y,
            offset_x: 0.0,
            row_width: row_width.max(1.0),
        }
    }

    pub fn phase(&self) -> SwipePhase {
        self.phase
    }

    pub fn offset(&self) -> f32 {
        self.offset_x
    }

    pub fn moved(&mut self, x: f32, y: f32) {
        let dx = x - self.origin_x;
        let dy = y - self.origin_y;
        match self.phase {
            SwipePhase::Tracking => {
                if dx.abs().max(dy.abs()) <= DEADZONE {
                    return;
                }
                if dx.abs() > dy.abs() {
                    self.phase = SwipePhase::LockedHorizontal;
                    self.apply_horizontal(dx);
                } else {
                    self.phase = SwipePhase::LockedVertical;
                    self.offset_x = 0.0;
                }
            }
            SwipePhase::LockedHorizontal => self.apply_horizontal(dx),
            SwipePhase::LockedVertical | SwipePhase::Settling | SwipePhase::Idle => {}
        }
    }

    /// Pointer up and pointer cancel both land here; whatever partial
    /// state accumulated decides the outcome under the same threshold.
    pub fn release(&mut self) -> SwipeOutcome {
        match self.phase {
            SwipePhase::LockedHorizontal => {
                let offset = self.offset_x;
                if offset.abs() / self.row_width >= COMMIT_FRACTION {
                    self.phase = SwipePhase::Settling;
                    debug!("swipe commit at offset {offset:.1}");
                    SwipeOutcome::Commit
                } else {
                    self.reset();
                    SwipeOutcome::Cancel { offset }
                }
            }
            _ => {
                let offset = self.offset_x;
                self.reset();
                SwipeOutcome::Cancel { offset }
            }
        }
    }

    /// Advances the off-screen settle animation one frame. Returns true
    /// exactly once, when the row has left the screen and the completion
    /// callback is due.
    pub fn settle_tick(&mut self) -> bool {
        if self.phase != SwipePhase::Settling {
            return false;
        }
        self.offset_x -= self.row_width * SETTLE_FRACTION;
        if self.offset_x <= -self.row_width {
            self.reset();
            return true;
        }
        false
    }

    fn apply_horizontal(&mut self, dx: f32) {
        let floor = -MAX_OFFSET.min(MAX_OFFSET_FRACTION * self.row_width);
        self.offset_x = dx.clamp(floor, 0.0);
    }

    fn reset(&mut self) {
        self.phase = SwipePhase::Idle;
        self.offset_x = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn horizontal_drag(width: f32, to_dx: f32) -> SwipeGesture {
        let mut gesture = SwipeGesture::begin(300.0, 50.0, width);
        gesture.moved(300.0 + to_dx, 50.0);
        gesture
    }

    #[test]
    fn release_at_threshold_commits() {
        let mut gesture = horizontal_drag(100.0, -55.0);
        assert_eq!(gesture.phase(), SwipePhase::LockedHorizontal);
        assert_eq!(gesture.release(), SwipeOutcome::Commit);
        assert_eq!(gesture.phase(), SwipePhase::Settling);
    }

    #[test]
    fn release_below_threshold_cancels_to_exactly_zero() {
        let mut gesture = horizontal_drag(200.0, -109.8);
        match gesture.release() {
            SwipeOutcome::Cancel { offset } => assert!((offset + 109.8).abs() < 1e-3),
            other => panic!("expected cancel, got {other:?}"),
        }
        assert_eq!(gesture.offset(), 0.0);
        assert_eq!(gesture.phase(), SwipePhase::Idle);
    }

    #[test]
    fn release_at_exact_fraction_of_wider_row_commits() {
        let mut gesture = horizontal_drag(200.0, -110.0);
        assert_eq!(gesture.release(), SwipeOutcome::Commit);
    }

    #[test]
    fn vertical_lock_never_commits() {
        let mut gesture = SwipeGesture::begin(300.0, 50.0, 100.0);
        gesture.moved(302.0, 62.0);
        assert_eq!(gesture.phase(), SwipePhase::LockedVertical);
        gesture.moved(120.0, 62.0);
        assert_eq!(gesture.offset(), 0.0);
        assert!(matches!(gesture.release(), SwipeOutcome::Cancel { .. }));
    }

    #[test]
    fn movement_inside_deadzone_does_not_lock() {
        let mut gesture = SwipeGesture::begin(300.0, 50.0, 100.0);
        gesture.moved(293.0, 53.0);
        assert_eq!(gesture.phase(), SwipePhase::Tracking);
        assert!(gesture.release().is_tap());
    }

    #[test]
    fn rightward_movement_clamps_to_zero() {
        let mut gesture = SwipeGesture::begin(300.0, 50.0, 100.0);
        gesture.moved(312.0, 50.0);
        assert_eq!(gesture.phase(), SwipePhase::LockedHorizontal);
        assert_eq!(gesture.offset(), 0.0);
    }

    #[test]
    fn offset_clamps_to_width_fraction_and_absolute_cap() {
        let mut narrow = horizontal_drag(100.0, -400.0);
        assert_eq!(narrow.offset(), -90.0);
        assert_eq!(narrow.release(), SwipeOutcome::Commit);

        let wide = horizontal_drag(400.0, -400.0);
        assert_eq!(wide.offset(), -220.0);
    }

    #[test]
    fn small_locked_offset_still_counts_as_tap() {
        let mut gesture = SwipeGesture::begin(300.0, 50.0, 100.0);
        gesture.moved(291.0, 50.0);
        gesture.moved(295.0, 50.0);
        let outcome = gesture.release();
        assert_eq!(outcome, SwipeOutcome::Cancel { offset: -5.0 });
        assert!(outcome.is_tap());

        let mut gesture = horizontal_drag(100.0, -9.0);
        assert!(!gesture.release().is_tap());
    }

    #[test]
    fn settle_runs_to_completion_once() {
        let mut gesture = horizontal_drag(100.0, -60.0);
        assert_eq!(gesture.release(), SwipeOutcome::Commit);
        let mut done = 0;
        for _ in 0..10 {
            if gesture.settle_tick() {
                done += 1;
            }
        }
        assert_eq!(done, 1);
        assert_eq!(gesture.phase(), SwipePhase::Idle);
        assert_eq!(gesture.offset(), 0.0);
    }
}
