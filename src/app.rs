use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use tokio::sync::watch;

use crate::components::event_form::EventFormState;
use crate::export::{self, ExportError};
use crate::planner::grid::{self, project_month};
use crate::planner::{Cell, Event, EventStore};

const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Form,
}

/// Composition root: owns the store, the displayed month, the selection,
/// the overlays and the pending export. The store is the single source of
/// truth; the projection is recomputed whenever its generation advances,
/// never patched incrementally.
pub struct App {
    pub running: bool,
    pub input_mode: InputMode,
    /// Anchor for the displayed month.
    pub reference_date: NaiveDate,
    pub selected_date: NaiveDate,
    pub today: NaiveDate,
    pub cells: Vec<Cell>,
    pub day_events: Vec<Event>,
    pub selected_event: usize,
    pub form_state: Option<EventFormState>,
    pub detail: Option<Event>,
    pub show_help: bool,
    toast: Option<(String, Instant)>,
    store: EventStore,
    store_changes: watch::Receiver<u64>,
    pending_export: Option<mpsc::Receiver<Result<PathBuf, ExportError>>>,
    export_dir: PathBuf,
}

impl App {
    pub fn new(store: EventStore, export_dir: PathBuf) -> Self {
        let today = Local::now().date_naive();
        let store_changes = store.subscribe();

        let mut app = Self {
            running: true,
            input_mode: InputMode::Normal,
            reference_date: today,
            selected_date: today,
            today,
            cells: Vec::new(),
            day_events: Vec::new(),
            selected_event: 0,
            form_state: None,
            detail: None,
            show_help: false,
            toast: None,
            store,
            store_changes,
            pending_export: None,
            export_dir,
        };
        app.refresh_projection();
        app
    }

    /// Once per loop iteration: pick up store changes, export results and
    /// toast expiry.
    pub fn tick(&mut self) {
        if self.store_changes.has_changed().unwrap_or(false) {
            self.store_changes.borrow_and_update();
            self.refresh_projection();
        }
        self.poll_export();
        if let Some((_, since)) = self.toast {
            if since.elapsed() >= TOAST_TTL {
                self.toast = None;
            }
        }
    }

    pub fn toast(&self) -> Option<&str> {
        self.toast.as_ref().map(|(msg, _)| msg.as_str())
    }

    fn set_toast(&mut self, msg: impl Into<String>) {
        self.toast = Some((msg.into(), Instant::now()));
    }

    fn refresh_projection(&mut self) {
        self.cells = project_month(self.reference_date, self.store.events());
        self.day_events = self
            .store
            .events()
            .iter()
            .filter(|ev| ev.occurs_on(self.selected_date))
            .cloned()
            .collect();
        if self.selected_event >= self.day_events.len() {
            self.selected_event = self.day_events.len().saturating_sub(1);
        }
    }

    // ── Navigation ──

    pub fn next_day(&mut self) {
        self.selected_date = self.selected_date.succ_opt().unwrap_or(self.selected_date);
        self.follow_selection();
    }

    pub fn prev_day(&mut self) {
        self.selected_date = self.selected_date.pred_opt().unwrap_or(self.selected_date);
        self.follow_selection();
    }

    pub fn next_week(&mut self) {
        self.selected_date += chrono::Duration::weeks(1);
        self.follow_selection();
    }

    pub fn prev_week(&mut self) {
        self.selected_date -= chrono::Duration::weeks(1);
        self.follow_selection();
    }

    pub fn next_month(&mut self) {
        self.shift_month(1);
    }

    pub fn prev_month(&mut self) {
        self.shift_month(-1);
    }

    fn shift_month(&mut self, delta: i32) {
        self.reference_date = grid::add_months(self.reference_date, delta);
        self.selected_date = grid::add_months(self.selected_date, delta);
        self.refresh_projection();
    }

    pub fn go_to_today(&mut self) {
        self.today = Local::now().date_naive();
        self.selected_date = self.today;
        self.reference_date = self.today;
        self.refresh_projection();
    }

    /// Keep the displayed month in step when day navigation crosses a
    /// month boundary.
    fn follow_selection(&mut self) {
        self.reference_date = self.selected_date;
        self.selected_event = 0;
        self.refresh_projection();
    }

    pub fn select_next_event(&mut self) {
        if self.selected_event + 1 < self.day_events.len() {
            self.selected_event += 1;
        }
    }

    pub fn select_prev_event(&mut self) {
        self.selected_event = self.selected_event.saturating_sub(1);
    }

    // ── Event form ──

    pub fn open_event_form(&mut self) {
        self.form_state = Some(EventFormState::new(self.selected_date));
        self.input_mode = InputMode::Form;
    }

    pub fn close_event_form(&mut self) {
        self.form_state = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn form_tab(&mut self) {
        if let Some(ref mut form) = self.form_state {
            form.active_field = form.active_field.next();
        }
    }

    pub fn form_backtab(&mut self) {
        if let Some(ref mut form) = self.form_state {
            form.active_field = form.active_field.prev();
        }
    }

    pub fn form_input_char(&mut self, c: char) {
        if let Some(ref mut form) = self.form_state {
            form.input_char(c);
        }
    }

    pub fn form_backspace(&mut self) {
        if let Some(ref mut form) = self.form_state {
            form.backspace();
        }
    }

    /// Incomplete input is a silent no-op: the form stays open and nothing
    /// reaches the store.
    pub fn submit_event_form(&mut self) {
        let Some(ref form) = self.form_state else {
            return;
        };
        let Some(date) = form.parsed_date() else {
            return;
        };
        if !form.is_valid() {
            return;
        }
        let title = form.title.clone();
        let location = form.location.clone();
        let time = form.time.clone();

        match self.store.add_event(title, location, date, time) {
            Ok(ev) => {
                let msg = format!("Event created: {} on {}", ev.title, ev.date);
                self.set_toast(msg);
                // Reset only once the event is safely stored, so a failed
                // save never discards the user's input.
                if let Some(ref mut form) = self.form_state {
                    form.reset(self.selected_date);
                }
                self.close_event_form();
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to save event");
                self.set_toast(format!("Failed to save event: {}", err));
            }
        }
    }

    // ── Detail popup / deletion ──

    pub fn show_detail(&mut self) {
        self.detail = self.day_events.get(self.selected_event).cloned();
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    /// Delete the event shown in the detail popup and dismiss it.
    pub fn delete_detail_event(&mut self) {
        if let Some(ev) = self.detail.take() {
            self.delete_event(ev);
        }
    }

    /// Delete the event selected in the day list.
    pub fn delete_selected_event(&mut self) {
        if let Some(ev) = self.day_events.get(self.selected_event).cloned() {
            self.delete_event(ev);
        }
    }

    fn delete_event(&mut self, ev: Event) {
        match self.store.delete_event(ev.id) {
            Ok(true) => self.set_toast(format!("Event deleted: {}", ev.title)),
            Ok(false) => {}
            Err(err) => {
                tracing::error!(error = %err, "failed to delete event");
                self.set_toast(format!("Failed to delete event: {}", err));
            }
        }
    }

    // ── Export ──

    /// Snapshot the current projection and hand it to the export worker.
    /// Mutations made while the export runs do not affect the artifact.
    pub fn start_export(&mut self) {
        if self.pending_export.is_some() {
            self.set_toast("Export already in progress");
            return;
        }
        self.set_toast("Exporting calendar...");
        self.pending_export = Some(export::start_export(
            self.cells.clone(),
            self.reference_date,
            self.today,
            self.export_dir.clone(),
        ));
    }

    fn poll_export(&mut self) {
        let Some(rx) = &self.pending_export else {
            return;
        };
        match rx.try_recv() {
            Ok(Ok(path)) => {
                self.set_toast(format!("Calendar saved to {}", path.display()));
                self.pending_export = None;
            }
            Ok(Err(err)) => {
                self.set_toast(format!("Export failed: {}", err));
                self.pending_export = None;
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                self.set_toast("Export failed");
                self.pending_export = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::event_form::FormField;
    use chrono::Datelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn app_in(dir: &tempfile::TempDir) -> App {
        let store = EventStore::open(dir.path().join("events.json")).unwrap();
        App::new(store, dir.path().to_path_buf())
    }

    fn fill_form(app: &mut App, title: &str, location: &str, date: &str, time: &str) {
        app.open_event_form();
        for c in title.chars() {
            app.form_input_char(c);
        }
        app.form_tab();
        for c in location.chars() {
            app.form_input_char(c);
        }
        app.form_tab();
        let form = app.form_state.as_mut().unwrap();
        form.date = date.to_string();
        form.active_field = FormField::Time;
        for c in time.chars() {
            app.form_input_char(c);
        }
    }

    #[test]
    fn form_submission_reaches_the_grid() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.selected_date = date(2024, 3, 4);
        app.reference_date = date(2024, 3, 4);

        fill_form(&mut app, "Standup", "Room 1", "2024-03-04", "09:00 AM");
        app.submit_event_form();
        app.tick();

        assert!(app.form_state.is_none());
        assert_eq!(app.store.events().len(), 1);
        assert_eq!(app.day_events.len(), 1);
        assert_eq!(app.day_events[0].title, "Standup");

        let march4 = app
            .cells
            .iter()
            .find_map(|c| match c {
                Cell::Day { date: d, events, .. } if d.day() == 4 => Some(events),
                _ => None,
            })
            .unwrap();
        assert_eq!(march4.len(), 1);
        assert_eq!(march4[0].title, "Standup");
    }

    #[test]
    fn incomplete_form_submission_is_a_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        app.open_event_form();
        app.form_input_char('x');
        app.submit_event_form();

        // Form stays open, nothing stored.
        assert!(app.form_state.is_some());
        assert!(app.store.events().is_empty());
    }

    #[test]
    fn failed_save_keeps_form_input_and_store_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);

        // A directory at the store path makes the persist rename fail.
        std::fs::create_dir(dir.path().join("events.json")).unwrap();

        fill_form(&mut app, "Standup", "Room 1", "2024-03-04", "09:00 AM");
        app.submit_event_form();
        app.tick();

        assert!(app.store.events().is_empty());
        let form = app.form_state.as_ref().expect("form stays open");
        assert_eq!(form.title, "Standup");
        assert_eq!(form.location, "Room 1");
        assert_eq!(form.time, "09:00 AM");
        assert!(app.toast().unwrap().contains("Failed to save event"));
    }

    #[test]
    fn detail_delete_removes_and_dismisses() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.selected_date = date(2024, 3, 4);
        app.reference_date = date(2024, 3, 4);

        fill_form(&mut app, "Standup", "Room 1", "2024-03-04", "09:00 AM");
        app.submit_event_form();
        app.tick();

        app.show_detail();
        assert!(app.detail.is_some());
        app.delete_detail_event();
        app.tick();

        assert!(app.detail.is_none());
        assert!(app.store.events().is_empty());
        assert!(app.day_events.is_empty());
    }

    #[test]
    fn month_navigation_clamps_end_of_month() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.selected_date = date(2024, 1, 31);
        app.reference_date = date(2024, 1, 31);

        app.next_month();
        assert_eq!(app.selected_date, date(2024, 2, 29));
        assert_eq!(app.reference_date, date(2024, 2, 29));

        app.prev_month();
        assert_eq!(app.selected_date, date(2024, 1, 29));
    }

    #[test]
    fn day_navigation_crossing_month_moves_the_grid() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.selected_date = date(2024, 3, 31);
        app.reference_date = date(2024, 3, 31);
        app.refresh_projection();

        app.next_day();
        assert_eq!(app.selected_date, date(2024, 4, 1));
        let first_day = app
            .cells
            .iter()
            .find_map(|c| match c {
                Cell::Day { date, .. } => Some(*date),
                _ => None,
            })
            .unwrap();
        assert_eq!(first_day, date(2024, 4, 1));
    }

    #[test]
    fn corrupted_file_starts_empty_and_usable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("events.json"), "not-json").unwrap();

        let mut app = app_in(&dir);
        assert!(app.store.events().is_empty());

        fill_form(&mut app, "a", "b", "2024-03-04", "09:00");
        app.submit_event_form();
        assert_eq!(app.store.events().len(), 1);
    }

    #[test]
    fn export_completion_surfaces_a_toast() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        app.start_export();
        assert_eq!(app.toast(), Some("Exporting calendar..."));

        let deadline = Instant::now() + Duration::from_secs(10);
        while app.pending_export.is_some() && Instant::now() < deadline {
            app.tick();
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(app.pending_export.is_none());
        let toast = app.toast().unwrap();
        assert!(toast.contains("Calendar saved") || toast.contains("Export failed"));
    }
}
