use crate::config::Config;
use crate::dial::{Dial, DialEvent, Pulse};
use crate::lifecycle::Lifecycle;
use crate::model::{DoneRecord, Item, ItemId, Lane, ListKind};
use crate::surface::{Feed, FileFeed};
use crate::swipe::{SwipeGesture, SwipeOutcome, SwipePhase};
use anyhow::Result;
use chrono::Local;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

const PULSE_FLASH: Duration = Duration::from_millis(150);

pub fn run(lifecycle: Lifecycle, config: Config, start_view: Option<String>) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(lifecycle, config);
    if let Some(name) = start_view {
        app.select_view_named(&name);
    }
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum View {
    Weather,
    News,
    Todo,
    Ideas,
    Done,
    Timer,
}

const VIEW_RING: [View; 6] = [
    View::Weather,
    View::News,
    View::Todo,
    View::Ideas,
    View::Done,
    View::Timer,
];

impl View {
    fn at(index: usize) -> View {
        VIEW_RING[index % VIEW_RING.len()]
    }

    fn label(self) -> &'static str {
        match self {
            View::Weather => "Weather",
            View::News => "News",
            View::Todo => "To do",
            View::Ideas => "Ideas",
            View::Done => "Done",
            View::Timer => "Timer",
        }
    }

    fn name(self) -> &'static str {
        match self {
            View::Weather => "weather",
            View::News => "news",
            View::Todo => "todo",
            View::Ideas => "ideas",
            View::Done => "done",
            View::Timer => "timer",
        }
    }

    fn glyph(self) -> &'static str {
        match self {
            View::Weather => "☀",
            View::News => "▤",
            View::Todo => "☑",
            View::Ideas => "✦",
            View::Done => "✔",
            View::Timer => "◔",
        }
    }

    fn from_name(name: &str) -> Option<View> {
        VIEW_RING
            .iter()
            .copied()
            .find(|view| view.name() == name.trim().to_ascii_lowercase())
    }

    fn lane(self) -> Option<Lane> {
        match self {
            View::Todo => Some(Lane::Todo),
            View::Ideas => Some(Lane::Ideas),
            _ => None,
        }
    }
}

/// One rendered list row, tagged by the list it belongs to. The tag
/// carries the row's capabilities: todo rows complete and promote, prio
/// rows complete and tap to edit, done rows restore, every row deletes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum RowRef {
    Todo(ItemId),
    Idea(ItemId),
    Prio(ItemId),
    Done(ItemId),
}

impl RowRef {
    fn id(&self) -> &str {
        match self {
            RowRef::Todo(id) | RowRef::Idea(id) | RowRef::Prio(id) | RowRef::Done(id) => id,
        }
    }

    fn swipe_lane(&self) -> Option<Lane> {
        match self {
            RowRef::Todo(_) => Some(Lane::Todo),
            RowRef::Prio(_) => Some(Lane::Prio),
            _ => None,
        }
    }

    fn list_kind(&self) -> ListKind {
        match self {
            RowRef::Todo(_) => ListKind::Todo,
            RowRef::Idea(_) => ListKind::Ideas,
            RowRef::Prio(_) => ListKind::Prio,
            RowRef::Done(_) => ListKind::Done,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowAction {
    Complete,
    Promote,
    Restore,
    Delete,
    Edit,
}

struct RowHit {
    rect: Rect,
    row: RowRef,
}

struct ActiveSwipe {
    row: RowRef,
    down_x: u16,
    rect: Rect,
    gesture: SwipeGesture,
}

enum Mode {
    Normal,
    Input { lane: Lane, field: FieldValue },
    EditPrio { id: ItemId, field: FieldValue },
    ConfirmClear,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum PanelFocus {
    Main,
    Prio,
}

struct TimerState {
    preset: Duration,
    started: Option<Instant>,
    banked: Duration,
}

impl TimerState {
    fn new(minutes: u64) -> Self {
        TimerState {
            preset: Duration::from_secs(minutes.max(1) * 60),
            started: None,
            banked: Duration::ZERO,
        }
    }

    fn elapsed(&self) -> Duration {
        let running = self.started.map(|at| at.elapsed()).unwrap_or(Duration::ZERO);
        self.banked + running
    }

    fn remaining(&self) -> Duration {
        self.preset.saturating_sub(self.elapsed())
    }

    fn running(&self) -> bool {
        self.started.is_some()
    }

    fn toggle(&mut self) {
        match self.started.take() {
            Some(at) => self.banked += at.elapsed(),
            None => {
                if self.remaining() > Duration::ZERO {
                    self.started = Some(Instant::now());
                }
            }
        }
    }

    fn reset(&mut self) {
        self.started = None;
        self.banked = Duration::ZERO;
    }
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_char(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_char(self.cursor, &self.value);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

struct App {
    lifecycle: Lifecycle,
    dial: Dial,
    preview: Option<View>,
    news: Box<dyn Feed>,
    weather: Box<dyn Feed>,
    timer: TimerState,
    mode: Mode,
    focus: PanelFocus,
    selected_main: usize,
    selected_prio: usize,
    status: String,
    last_save: Instant,
    pulse_flash: Option<(Pulse, Instant)>,
    swipe: Option<ActiveSwipe>,
    row_hits: Vec<RowHit>,
    main_area: Rect,
    dial_area: Rect,
}

impl App {
    fn new(lifecycle: Lifecycle, config: Config) -> Self {
        let refresh = Duration::from_secs(config.news_refresh_minutes.max(1) * 60);
        App {
            lifecycle,
            dial: Dial::new(VIEW_RING.len()),
            preview: None,
            news: Box::new(FileFeed::new("News", config.news_feed.clone(), refresh)),
            weather: Box::new(FileFeed::new("Weather", config.weather_feed.clone(), refresh)),
            timer: TimerState::new(config.timer_minutes),
            mode: Mode::Normal,
            focus: PanelFocus::Main,
            selected_main: 0,
            selected_prio: 0,
            status: "Welcome. Drag the dial, swipe rows left, press q to quit.".into(),
            last_save: Instant::now(),
            pulse_flash: None,
            swipe: None,
            row_hits: Vec::new(),
            main_area: Rect::default(),
            dial_area: Rect::default(),
        }
    }

    fn view(&self) -> View {
        View::at(self.dial.current_index())
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            self.tick();
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(80))? {
                match event::read()? {
                    Event::Key(key) => {
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_key(key)? {
                            break;
                        }
                    }
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn tick(&mut self) {
        self.news.tick();
        self.weather.tick();
        if let Some((_, at)) = self.pulse_flash {
            if at.elapsed() > PULSE_FLASH {
                self.pulse_flash = None;
            }
        }
        if let Some(active) = &mut self.swipe {
            if active.gesture.phase() == SwipePhase::Settling && active.gesture.settle_tick() {
                let row = active.row.clone();
                self.swipe = None;
                if let Some(lane) = row.swipe_lane() {
                    let id = row.id().to_string();
                    self.apply(|core| core.complete(lane, &id), "Completed");
                }
            }
        }
        self.ensure_bounds();
    }

    // ---- input -----------------------------------------------------------

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match &self.mode {
            Mode::Normal => return self.handle_normal_key(key),
            Mode::Input { .. } | Mode::EditPrio { .. } => self.handle_field_key(key),
            Mode::ConfirmClear => self.handle_confirm_key(key),
        }
        Ok(false)
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char(digit @ '1'..='6') => {
                let index = digit as usize - '1' as usize;
                let event = self.dial.select(index);
                self.view_committed(event);
            }
            KeyCode::Left | KeyCode::Char('h') => {
                if let Some(event) = self.dial.nudge(-1) {
                    self.view_committed(event);
                }
            }
            KeyCode::Right | KeyCode::Char('l') => {
                if let Some(event) = self.dial.nudge(1) {
                    self.view_committed(event);
                }
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    PanelFocus::Main => PanelFocus::Prio,
                    PanelFocus::Prio => PanelFocus::Main,
                };
            }
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Char('a') => self.start_input(),
            KeyCode::Char('e') => self.start_prio_edit(),
            KeyCode::Enter | KeyCode::Char('c') => self.complete_selected(),
            KeyCode::Char('f') => self.promote_selected(),
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char('u') => self.restore_selected(),
            KeyCode::Char('x') => {
                if self.view() == View::Done && !self.lifecycle.store().done.is_empty() {
                    self.mode = Mode::ConfirmClear;
                    self.status = "Clear all done items? (y/n)".into();
                }
            }
            KeyCode::Char('r') => match self.view() {
                View::News => {
                    self.news.refresh();
                    self.status = "News refreshed".into();
                }
                View::Weather => {
                    self.weather.refresh();
                    self.status = "Weather refreshed".into();
                }
                View::Timer => {
                    self.timer.reset();
                    self.status = "Timer reset".into();
                }
                View::Done => self.restore_selected(),
                _ => {}
            },
            KeyCode::Char(' ') => {
                if self.view() == View::Timer {
                    self.timer.toggle();
                    self.status = if self.timer.running() {
                        "Timer running".into()
                    } else {
                        "Timer paused".into()
                    };
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_field_key(&mut self, key: KeyEvent) {
        let mut close = false;
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        match &mut mode {
            Mode::Input { lane, field } => match key.code {
                KeyCode::Esc => {
                    close = true;
                    self.status = "Canceled".into();
                }
                KeyCode::Enter => {
                    let lane = *lane;
                    let text = field.value.clone();
                    if text.trim().is_empty() {
                        self.status = "Nothing added".into();
                    } else {
                        self.apply(|core| core.add(lane, &text), "Added");
                    }
                    close = true;
                }
                KeyCode::Left => field.move_left(),
                KeyCode::Right => field.move_right(),
                KeyCode::Backspace => field.backspace(),
                KeyCode::Char(c) => {
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    {
                        field.insert_char(c);
                    }
                }
                _ => {}
            },
            Mode::EditPrio { id, field } => match key.code {
                KeyCode::Esc => {
                    close = true;
                    self.status = "Canceled".into();
                }
                KeyCode::Enter => {
                    if field.value.trim().is_empty() {
                        self.status = "Text required".into();
                    } else {
                        let id = id.clone();
                        let text = field.value.clone();
                        self.apply(|core| core.edit_text(Lane::Prio, &id, &text), "Updated");
                        close = true;
                    }
                }
                KeyCode::Left => field.move_left(),
                KeyCode::Right => field.move_right(),
                KeyCode::Backspace => field.backspace(),
                KeyCode::Char(c) => {
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    {
                        field.insert_char(c);
                    }
                }
                _ => {}
            },
            Mode::Normal | Mode::ConfirmClear => {}
        }
        self.mode = if close { Mode::Normal } else { mode };
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                self.apply(|core| core.clear_done(), "Cleared done");
                self.mode = Mode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Kept done items".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !matches!(self.mode, Mode::Normal) {
            return;
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.pointer_down(mouse.column, mouse.row),
            MouseEventKind::Drag(MouseButton::Left) => self.pointer_move(mouse.column, mouse.row),
            MouseEventKind::Up(_) => self.pointer_up(),
            MouseEventKind::ScrollDown => self.wheel(mouse.column, mouse.row, 1),
            MouseEventKind::ScrollUp => self.wheel(mouse.column, mouse.row, -1),
            _ => {}
        }
    }

    fn pointer_down(&mut self, x: u16, y: u16) {
        if rect_contains(self.dial_area, x, y) {
            self.dial.begin_drag(self.dial_center(), dial_point(x, y));
            return;
        }
        let hit = self
            .row_hits
            .iter()
            .find(|hit| rect_contains(hit.rect, x, y))
            .map(|hit| (hit.row.clone(), hit.rect));
        let Some((row, rect)) = hit else {
            return;
        };
        // Grabbing the settling row again supersedes its pending
        // completion; grabbing a different row fast-forwards it.
        if let Some(active) = self.swipe.take() {
            if active.gesture.phase() == SwipePhase::Settling && active.row != row {
                if let Some(lane) = active.row.swipe_lane() {
                    let id = active.row.id().to_string();
                    self.apply(|core| core.complete(lane, &id), "Completed");
                }
            }
        }
        self.swipe = Some(ActiveSwipe {
            row,
            down_x: x,
            rect,
            gesture: SwipeGesture::begin(x as f32, y as f32, rect.width as f32),
        });
    }

    fn pointer_move(&mut self, x: u16, y: u16) {
        if self.dial.dragging() {
            if let Some(event) = self.dial.drag_to(self.dial_center(), dial_point(x, y)) {
                self.preview = Some(View::at(event.sector));
                self.pulse_flash = Some((event.pulse, Instant::now()));
            }
            return;
        }
        if let Some(active) = &mut self.swipe {
            if active.gesture.phase() != SwipePhase::Settling {
                active.gesture.moved(x as f32, y as f32);
            }
        }
    }

    fn pointer_up(&mut self) {
        if self.dial.dragging() {
            if let Some(event) = self.dial.end_drag() {
                self.view_committed(event);
            }
            return;
        }
        let Some(active) = &mut self.swipe else {
            return;
        };
        if active.gesture.phase() == SwipePhase::Settling {
            return;
        }
        let outcome = active.gesture.release();
        let row = active.row.clone();
        let rect = active.rect;
        let down_x = active.down_x;
        match outcome {
            SwipeOutcome::Commit => {
                // A committed swipe stays around to settle; tick()
                // finishes the completion once the row is off-screen.
                if row.swipe_lane().is_none() {
                    self.swipe = None;
                }
            }
            SwipeOutcome::Cancel { .. } => {
                self.swipe = None;
                if outcome.is_tap() {
                    if let Some(action) = tap_action(&row, rect, down_x) {
                        self.run_row_action(&row, action);
                    }
                }
            }
        }
    }

    fn wheel(&mut self, x: u16, y: u16, delta: i64) {
        if !rect_contains(self.main_area, x, y) {
            return;
        }
        if let Some(event) = self.dial.nudge(delta) {
            self.view_committed(event);
        }
    }

    // ---- actions ---------------------------------------------------------

    fn view_committed(&mut self, event: DialEvent) {
        self.preview = None;
        self.pulse_flash = Some((event.pulse, Instant::now()));
        self.selected_main = 0;
        self.status = format!("View: {}", View::at(event.sector).label());
    }

    fn select_view_named(&mut self, name: &str) {
        if let Some(view) = View::from_name(name) {
            let index = VIEW_RING.iter().position(|v| *v == view).unwrap_or(0);
            let event = self.dial.select(index);
            self.view_committed(event);
        }
    }

    fn start_input(&mut self) {
        let lane = match self.focus {
            PanelFocus::Prio => Some(Lane::Prio),
            PanelFocus::Main => self.view().lane(),
        };
        if let Some(lane) = lane {
            self.mode = Mode::Input {
                lane,
                field: FieldValue::new(""),
            };
            self.status = format!("New {} item (Enter saves, Esc cancels)", lane.label());
        } else {
            self.status = "Switch to a list view to add items".into();
        }
    }

    fn start_prio_edit(&mut self) {
        if self.focus != PanelFocus::Prio {
            return;
        }
        let Some(item) = self.lifecycle.store().prio.get(self.selected_prio) else {
            return;
        };
        self.mode = Mode::EditPrio {
            id: item.id.clone(),
            field: FieldValue::new(&item.text),
        };
        self.status = "Editing priority item".into();
    }

    fn selected_row(&self) -> Option<RowRef> {
        match self.focus {
            PanelFocus::Prio => self
                .lifecycle
                .store()
                .prio
                .get(self.selected_prio)
                .map(|item| RowRef::Prio(item.id.clone())),
            PanelFocus::Main => {
                let store = self.lifecycle.store();
                match self.view() {
                    View::Todo => store
                        .todo
                        .get(self.selected_main)
                        .map(|item| RowRef::Todo(item.id.clone())),
                    View::Ideas => store
                        .ideas
                        .get(self.selected_main)
                        .map(|item| RowRef::Idea(item.id.clone())),
                    View::Done => store
                        .done
                        .get(self.selected_main)
                        .map(|record| RowRef::Done(record.item.id.clone())),
                    _ => None,
                }
            }
        }
    }

    fn complete_selected(&mut self) {
        if let Some(row) = self.selected_row() {
            if row.swipe_lane().is_some() {
                self.run_row_action(&row, RowAction::Complete);
            }
        }
    }

    fn promote_selected(&mut self) {
        if let Some(row @ RowRef::Todo(_)) = self.selected_row() {
            self.run_row_action(&row, RowAction::Promote);
        }
    }

    fn delete_selected(&mut self) {
        if let Some(row) = self.selected_row() {
            self.run_row_action(&row, RowAction::Delete);
        }
    }

    fn restore_selected(&mut self) {
        if let Some(row @ RowRef::Done(_)) = self.selected_row() {
            self.run_row_action(&row, RowAction::Restore);
        }
    }

    fn run_row_action(&mut self, row: &RowRef, action: RowAction) {
        let id = row.id().to_string();
        match action {
            RowAction::Complete => {
                if let Some(lane) = row.swipe_lane() {
                    self.apply(|core| core.complete(lane, &id), "Completed");
                }
            }
            RowAction::Promote => {
                self.apply(|core| core.promote(&id), "Moved to priority");
            }
            RowAction::Restore => {
                self.apply(|core| core.restore(&id), "Restored");
            }
            RowAction::Delete => {
                let kind = row.list_kind();
                self.apply(|core| core.remove(kind, &id), "Removed");
            }
            RowAction::Edit => {
                if let RowRef::Prio(id) = row {
                    let Some(item) = self
                        .lifecycle
                        .store()
                        .prio
                        .iter()
                        .find(|item| &item.id == id)
                    else {
                        return;
                    };
                    self.mode = Mode::EditPrio {
                        id: id.clone(),
                        field: FieldValue::new(&item.text),
                    };
                    self.status = "Editing priority item".into();
                }
            }
        }
    }

    fn apply<F>(&mut self, op: F, done: &str)
    where
        F: FnOnce(&mut Lifecycle) -> Result<bool>,
    {
        match op(&mut self.lifecycle) {
            Ok(true) => {
                self.last_save = Instant::now();
                self.status = done.into();
            }
            Ok(false) => {}
            Err(err) => self.status = format!("Save failed: {err}"),
        }
        self.ensure_bounds();
    }

    fn move_selection(&mut self, delta: i64) {
        let len = match self.focus {
            PanelFocus::Prio => self.lifecycle.store().prio.len(),
            PanelFocus::Main => match self.view() {
                View::Todo => self.lifecycle.store().todo.len(),
                View::Ideas => self.lifecycle.store().ideas.len(),
                View::Done => self.lifecycle.store().done.len(),
                _ => 0,
            },
        };
        if len == 0 {
            return;
        }
        let slot = match self.focus {
            PanelFocus::Prio => &mut self.selected_prio,
            PanelFocus::Main => &mut self.selected_main,
        };
        let next = (*slot as i64 + delta).clamp(0, len as i64 - 1);
        *slot = next as usize;
    }

    fn ensure_bounds(&mut self) {
        let store = self.lifecycle.store();
        let main_len = match self.view() {
            View::Todo => store.todo.len(),
            View::Ideas => store.ideas.len(),
            View::Done => store.done.len(),
            _ => 0,
        };
        self.selected_main = self.selected_main.min(main_len.saturating_sub(1));
        self.selected_prio = self.selected_prio.min(store.prio.len().saturating_sub(1));
    }

    fn dial_center(&self) -> (f64, f64) {
        let cx = self.dial_area.x as f64 + self.dial_area.width as f64 / 2.0;
        let cy = self.dial_area.y as f64 + self.dial_area.height as f64 / 2.0;
        // Same y stretch as dial_point, so angles stay consistent.
        (cx, cy * 2.0)
    }

    // ---- drawing ---------------------------------------------------------

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        self.row_hits.clear();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(72), Constraint::Percentage(28)])
            .split(layout[1]);
        self.main_area = body[0];

        match self.view() {
            View::Weather => self.draw_feed(f, body[0], false),
            View::News => self.draw_feed(f, body[0], true),
            View::Todo => self.draw_list(f, body[0], View::Todo),
            View::Ideas => self.draw_list(f, body[0], View::Ideas),
            View::Done => self.draw_list(f, body[0], View::Done),
            View::Timer => self.draw_timer(f, body[0]),
        }
        self.draw_dial(f, body[0]);
        self.draw_prio(f, body[1]);
        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::Input { lane, field } => {
                let title = format!("New {} item", lane.label());
                draw_field_popup(f, &title, field);
            }
            Mode::EditPrio { field, .. } => draw_field_popup(f, "Edit priority item", field),
            Mode::ConfirmClear => draw_confirm_popup(f),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let today = Local::now().format("%A %d %B %Y").to_string();
        let title = Line::from(vec![
            Span::styled(
                "dialdash ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(today, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  •  "),
            Span::styled(
                format!("saved {}", format_elapsed(self.last_save)),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("view {}", self.view().name()),
                Style::default().fg(Color::Magenta),
            ),
        ]);
        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_feed(&mut self, f: &mut ratatui::Frame<'_>, area: Rect, news: bool) {
        let feed = if news { &self.news } else { &self.weather };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                format!("{}  [{}]", feed.title(), feed.status()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        f.render_widget(block, area);

        if feed.rows().is_empty() {
            let hint = Paragraph::new("Nothing here yet. Press r to refresh.")
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(hint, inner);
            return;
        }
        let lines: Vec<Line> = feed
            .rows()
            .iter()
            .take(inner.height as usize)
            .map(|row| {
                let mut spans = vec![Span::styled(
                    truncate_text(&row.text, inner.width.saturating_sub(10) as usize),
                    Style::default().add_modifier(Modifier::BOLD),
                )];
                if !row.meta.is_empty() {
                    spans.push(Span::raw("  "));
                    spans.push(Span::styled(
                        row.meta.clone(),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                Line::from(spans)
            })
            .collect();
        f.render_widget(Paragraph::new(lines), inner);
    }

    fn draw_list(&mut self, f: &mut ratatui::Frame<'_>, area: Rect, view: View) {
        let store = self.lifecycle.store();
        let count = match view {
            View::Todo => store.todo.len(),
            View::Ideas => store.ideas.len(),
            View::Done => store.done.len(),
            _ => 0,
        };
        let focused = self.focus == PanelFocus::Main;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                format!("{} ({})", view.label(), count),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(if focused {
                        Modifier::BOLD | Modifier::UNDERLINED
                    } else {
                        Modifier::BOLD
                    }),
            ));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let rows: Vec<(RowRef, Line)> = match view {
            View::Todo => store
                .todo
                .iter()
                .map(|item| {
                    (
                        RowRef::Todo(item.id.clone()),
                        todo_line(item, inner.width),
                    )
                })
                .collect(),
            View::Ideas => store
                .ideas
                .iter()
                .map(|item| {
                    (
                        RowRef::Idea(item.id.clone()),
                        idea_line(item, inner.width),
                    )
                })
                .collect(),
            View::Done => store
                .done
                .iter()
                .map(|record| {
                    (
                        RowRef::Done(record.item.id.clone()),
                        done_line(record, inner.width),
                    )
                })
                .collect(),
            _ => Vec::new(),
        };
        let selected = if focused { Some(self.selected_main) } else { None };
        self.render_rows(f, inner, rows, selected);

        if count == 0 {
            let hint = match view {
                View::Todo => "No tasks right now. Press a to add one.",
                View::Ideas => "No ideas saved yet. Press a to add one.",
                View::Done => "Nothing finished yet.",
                _ => "",
            };
            let paragraph =
                Paragraph::new(hint).style(Style::default().fg(Color::DarkGray));
            f.render_widget(paragraph, inner);
        }
    }

    fn draw_prio(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let store = self.lifecycle.store();
        let focused = self.focus == PanelFocus::Prio;
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                format!("Priority ({})", store.prio.len()),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(if focused {
                        Modifier::BOLD | Modifier::UNDERLINED
                    } else {
                        Modifier::BOLD
                    }),
            ));
        let inner = block.inner(area);
        f.render_widget(block, area);

        if store.prio.is_empty() {
            let hint = Paragraph::new("Nothing active. Tab here, then a.")
                .style(Style::default().fg(Color::DarkGray));
            f.render_widget(hint, inner);
            return;
        }
        let rows: Vec<(RowRef, Line)> = store
            .prio
            .iter()
            .map(|item| {
                (
                    RowRef::Prio(item.id.clone()),
                    prio_line(item, inner.width),
                )
            })
            .collect();
        let selected = if focused { Some(self.selected_prio) } else { None };
        self.render_rows(f, inner, rows, selected);
    }

    fn render_rows(
        &mut self,
        f: &mut ratatui::Frame<'_>,
        inner: Rect,
        rows: Vec<(RowRef, Line<'static>)>,
        selected: Option<usize>,
    ) {
        let viewport = inner.height as usize;
        let offset = selected
            .map(|sel| scroll_offset(sel, viewport, rows.len()))
            .unwrap_or(0);
        let mut lines: Vec<Line> = Vec::with_capacity(viewport);
        for (idx, (row, line)) in rows.into_iter().enumerate().skip(offset).take(viewport) {
            let rect = Rect {
                x: inner.x,
                y: inner.y + (idx - offset) as u16,
                width: inner.width,
                height: 1,
            };
            let line = self.swiped_line(&row, line);
            let line = if selected == Some(idx) {
                let spans: Vec<Span> = line
                    .spans
                    .into_iter()
                    .map(|span| {
                        Span::styled(span.content, span.style.add_modifier(Modifier::REVERSED))
                    })
                    .collect();
                Line::from(spans)
            } else {
                line
            };
            lines.push(line);
            self.row_hits.push(RowHit { rect, row });
        }
        f.render_widget(Paragraph::new(lines), inner);
    }

    /// Applies the active swipe's horizontal offset to a row: the content
    /// slides left and drains off the edge.
    fn swiped_line(&self, row: &RowRef, line: Line<'static>) -> Line<'static> {
        let Some(active) = &self.swipe else {
            return line;
        };
        if &active.row != row {
            return line;
        }
        let shift = (-active.gesture.offset()).max(0.0) as usize;
        if shift == 0 {
            return line;
        }
        let text: String = line
            .spans
            .iter()
            .map(|span| span.content.as_ref())
            .collect::<String>()
            .chars()
            .skip(shift)
            .collect();
        let style = if active.gesture.phase() == SwipePhase::Settling {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::Yellow)
        };
        Line::from(Span::styled(text, style))
    }

    fn draw_dial(&mut self, f: &mut ratatui::Frame<'_>, main: Rect) {
        let width = 14u16.min(main.width);
        let height = 5u16.min(main.height);
        self.dial_area = Rect {
            x: main.x + main.width - width,
            y: main.y + main.height - height,
            width,
            height,
        };
        let shown = self.preview.unwrap_or_else(|| self.view());
        let border = match self.pulse_flash {
            Some((Pulse::Confirm, _)) => Color::Cyan,
            Some((Pulse::Tick, _)) => Color::Yellow,
            None => Color::DarkGray,
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title("dial");
        let inner = block.inner(self.dial_area);
        f.render_widget(Clear, self.dial_area);
        f.render_widget(block, self.dial_area);

        let dots: String = (0..VIEW_RING.len())
            .map(|idx| {
                if idx == self.dial.current_index() {
                    '●'
                } else {
                    '○'
                }
            })
            .collect();
        let lines = vec![
            Line::from(Span::styled(
                format!("{} {}", shown.glyph(), shown.label()),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(dots, Style::default().fg(Color::Gray))),
            Line::from(Span::styled(
                format!("{:>5.0}°", self.dial.rotation()),
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
        f.render_widget(paragraph, inner);
    }

    fn draw_timer(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(
                "Timer",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let remaining = self.timer.remaining();
        let mins = remaining.as_secs() / 60;
        let secs = remaining.as_secs() % 60;
        let state = if remaining.is_zero() {
            "done"
        } else if self.timer.running() {
            "running"
        } else {
            "paused"
        };
        let lines = vec![
            Line::raw(""),
            Line::from(Span::styled(
                format!("{:02}:{:02}", mins, secs),
                Style::default()
                    .fg(if remaining.is_zero() {
                        Color::LightRed
                    } else {
                        Color::LightGreen
                    })
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(state, Style::default().fg(Color::Gray))),
            Line::raw(""),
            Line::from(Span::styled(
                "space start/pause  •  r reset",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
        f.render_widget(paragraph, inner);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let help = match self.view() {
            View::Todo => "a add  c complete  f promote  d delete  ←/→ views  Tab priority  q quit",
            View::Ideas => "a add  d delete  ←/→ views  Tab priority  q quit",
            View::Done => "u restore  d delete  x clear all  ←/→ views  q quit",
            View::Timer => "space start/pause  r reset  ←/→ views  q quit",
            _ => "r refresh  ←/→ views  1-6 jump  Tab priority  q quit",
        };
        let lines = vec![
            Line::from(Span::styled(
                self.status.clone(),
                Style::default().fg(Color::LightYellow),
            )),
            Line::from(Span::styled(help, Style::default().fg(Color::DarkGray))),
        ];
        let block = Block::default()
            .borders(Borders::TOP)
            .border_style(Style::default().fg(Color::DarkGray));
        f.render_widget(Paragraph::new(lines).block(block), area);
    }
}

// ---- row lines -----------------------------------------------------------

fn todo_line(item: &Item, width: u16) -> Line<'static> {
    row_line("✓ ! ", &item.text, &format_ms(item.created_at), width)
}

fn idea_line(item: &Item, width: u16) -> Line<'static> {
    row_line("", &item.text, &format_ms(item.created_at), width)
}

fn prio_line(item: &Item, width: u16) -> Line<'static> {
    row_line("✓ ", &item.text, &format_ms(item.created_at), width)
}

fn done_line(record: &DoneRecord, width: u16) -> Line<'static> {
    row_line(
        "↩ ",
        &record.item.text,
        &format!("{} ← {}", format_ms(record.done_at), record.origin.label()),
        width,
    )
}

fn row_line(prefix: &str, text: &str, meta: &str, width: u16) -> Line<'static> {
    let trash = " ✖";
    let reserved = prefix.chars().count() + meta.chars().count() + trash.chars().count() + 3;
    let text_width = (width as usize).saturating_sub(reserved).max(4);
    let body = truncate_text(text, text_width);
    let padding = text_width.saturating_sub(body.chars().count());
    Line::from(vec![
        Span::styled(prefix.to_string(), Style::default().fg(Color::LightGreen)),
        Span::raw(body),
        Span::raw(" ".repeat(padding + 1)),
        Span::styled(meta.to_string(), Style::default().fg(Color::DarkGray)),
        Span::styled(trash.to_string(), Style::default().fg(Color::Red)),
    ])
}

/// Maps a tap's column back to the glyph zone it landed on. Zones mirror
/// the row layout: action glyphs on the left, delete on the right, and
/// for priority rows the text body opens the editor.
fn tap_action(row: &RowRef, rect: Rect, x: u16) -> Option<RowAction> {
    let rel = x.saturating_sub(rect.x);
    let delete_zone = rel + 2 >= rect.width;
    match row {
        RowRef::Todo(_) => {
            if rel < 2 {
                Some(RowAction::Complete)
            } else if rel < 4 {
                Some(RowAction::Promote)
            } else if delete_zone {
                Some(RowAction::Delete)
            } else {
                None
            }
        }
        RowRef::Idea(_) => delete_zone.then_some(RowAction::Delete),
        RowRef::Prio(_) => {
            if rel < 2 {
                Some(RowAction::Complete)
            } else if delete_zone {
                Some(RowAction::Delete)
            } else {
                Some(RowAction::Edit)
            }
        }
        RowRef::Done(_) => {
            if rel < 2 {
                Some(RowAction::Restore)
            } else if delete_zone {
                Some(RowAction::Delete)
            } else {
                None
            }
        }
    }
}

// ---- popups --------------------------------------------------------------

fn draw_field_popup(f: &mut ratatui::Frame<'_>, title: &str, field: &FieldValue) {
    let area = centered_rect(60, 20, f.size());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            title.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    let lines = vec![
        Line::from(Span::styled(
            field.with_caret(),
            Style::default().fg(Color::White),
        )),
        Line::raw(""),
        Line::from(Span::styled(
            "Enter save  •  Esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

fn draw_confirm_popup(f: &mut ratatui::Frame<'_>) {
    let area = centered_rect(40, 15, f.size());
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            "Clear done",
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(block, area);
    let lines = vec![
        Line::raw("Delete every done record?"),
        Line::raw(""),
        Line::from(Span::styled(
            "y confirm  •  n cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(Paragraph::new(lines), inner);
}

// ---- terminal plumbing ---------------------------------------------------

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}

// ---- helpers -------------------------------------------------------------

fn rect_contains(rect: Rect, x: u16, y: u16) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

/// Terminal cells are roughly twice as tall as they are wide; stretching
/// y keeps drag angles close to what the hand draws.
fn dial_point(x: u16, y: u16) -> (f64, f64) {
    (x as f64, y as f64 * 2.0)
}

fn scroll_offset(selected: usize, viewport: usize, len: usize) -> usize {
    if viewport == 0 || len <= viewport {
        return 0;
    }
    let max_offset = len - viewport;
    selected.saturating_sub(viewport / 2).min(max_offset)
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn truncate_text(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn format_ms(ms: i64) -> String {
    use chrono::TimeZone;
    match Local.timestamp_millis_opt(ms).single() {
        Some(when) => when.format("%m-%d %H:%M").to_string(),
        None => String::new(),
    }
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

fn prev_char(cursor: usize, text: &str) -> usize {
    if cursor == 0 {
        return 0;
    }
    let mut prev = 0;
    for (idx, _) in text.char_indices() {
        if idx >= cursor {
            break;
        }
        prev = idx;
    }
    prev
}

fn next_char(cursor: usize, text: &str) -> usize {
    for (idx, ch) in text.char_indices() {
        if idx > cursor {
            return idx;
        }
        if idx == cursor {
            return cursor + ch.len_utf8();
        }
    }
    text.len()
}
