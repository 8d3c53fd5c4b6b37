use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Title,
    Location,
    Date,
    Time,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Title => FormField::Location,
            FormField::Location => FormField::Date,
            FormField::Date => FormField::Time,
            FormField::Time => FormField::Title,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Title => FormField::Time,
            FormField::Location => FormField::Title,
            FormField::Date => FormField::Location,
            FormField::Time => FormField::Date,
        }
    }
}

/// Input state for the new-event overlay. Submission is gated on
/// `is_valid()`; an invalid submit is a silent no-op and the form stays
/// open with its contents intact.
#[derive(Debug, Clone)]
pub struct EventFormState {
    pub title: String,
    pub location: String,
    pub date: String,
    pub time: String,
    pub active_field: FormField,
}

impl EventFormState {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            title: String::new(),
            location: String::new(),
            date: date.format("%Y-%m-%d").to_string(),
            time: String::new(),
            active_field: FormField::Title,
        }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    pub fn input_char(&mut self, c: char) {
        match self.active_field {
            FormField::Title => self.title.push(c),
            FormField::Location => self.location.push(c),
            FormField::Date => self.date.push(c),
            FormField::Time => self.time.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.active_field {
            FormField::Title => { self.title.pop(); }
            FormField::Location => { self.location.pop(); }
            FormField::Date => { self.date.pop(); }
            FormField::Time => { self.time.pop(); }
        }
    }

    /// Every field present, date parseable. The time string is free-form
    /// beyond being non-empty.
    pub fn is_valid(&self) -> bool {
        !self.title.is_empty()
            && !self.location.is_empty()
            && !self.time.is_empty()
            && self.parsed_date().is_some()
    }

    /// Reset every field to its default, ready for the next entry.
    pub fn reset(&mut self, date: NaiveDate) {
        *self = Self::new(date);
    }
}

pub struct EventForm;

impl EventForm {
    pub fn render(frame: &mut Frame, area: Rect, state: &EventFormState) {
        // Center the form popup
        let form_w = area.width.min(50).max(30);
        let form_h = area.height.min(12).max(9);
        let x = area.x + (area.width.saturating_sub(form_w)) / 2;
        let y = area.y + (area.height.saturating_sub(form_h)) / 2;
        let form_area = Rect::new(x, y, form_w, form_h);

        // Clear background
        frame.render_widget(Clear, form_area);

        let block = Block::default()
            .title(" New Event ")
            .title_style(theme::current().accent)
            .borders(Borders::ALL)
            .border_style(theme::current().accent);

        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let rows = Layout::vertical([
            Constraint::Length(1), // title
            Constraint::Length(1), // location
            Constraint::Length(1), // date
            Constraint::Length(1), // time
            Constraint::Length(1), // spacer
            Constraint::Length(1), // help
            Constraint::Min(0),
        ])
        .split(inner);

        render_field(frame, rows[0], "Title:", &state.title, state.active_field == FormField::Title);
        render_field(frame, rows[1], "Where:", &state.location, state.active_field == FormField::Location);
        render_field(frame, rows[2], "Date:", &state.date, state.active_field == FormField::Date);
        render_field(frame, rows[3], "Time:", &state.time, state.active_field == FormField::Time);

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Next ", theme::current().dim),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Save ", theme::current().dim),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Cancel", theme::current().dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[5]);
    }
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let cursor = if active { "_" } else { "" };

    let style = if active {
        Style::default().fg(ratatui::style::Color::Cyan)
    } else {
        Style::default()
    };

    let spans = vec![
        Span::styled(format!("{:<7}", label), theme::current().dim),
        Span::styled(format!("{}{}", value, cursor), style),
    ];

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn filled() -> EventFormState {
        let mut state = EventFormState::new(date(2024, 3, 4));
        state.title = "Standup".into();
        state.location = "Room 1".into();
        state.time = "09:00 AM".into();
        state
    }

    #[test]
    fn complete_form_is_valid() {
        assert!(filled().is_valid());
    }

    #[test]
    fn any_empty_field_blocks_submission() {
        let mut state = filled();
        state.title.clear();
        assert!(!state.is_valid());

        let mut state = filled();
        state.location.clear();
        assert!(!state.is_valid());

        let mut state = filled();
        state.time.clear();
        assert!(!state.is_valid());

        let mut state = filled();
        state.date.clear();
        assert!(!state.is_valid());
    }

    #[test]
    fn unparseable_date_blocks_submission() {
        let mut state = filled();
        state.date = "03/04/2024".into();
        assert!(!state.is_valid());
    }

    #[test]
    fn reset_returns_fields_to_defaults() {
        let mut state = filled();
        state.active_field = FormField::Time;
        state.reset(date(2024, 3, 4));
        assert!(state.title.is_empty());
        assert!(state.location.is_empty());
        assert!(state.time.is_empty());
        assert_eq!(state.date, "2024-03-04");
        assert_eq!(state.active_field, FormField::Title);
    }

    #[test]
    fn input_targets_the_active_field() {
        let mut state = EventFormState::new(date(2024, 3, 4));
        state.input_char('a');
        state.active_field = FormField::Location;
        state.input_char('b');
        assert_eq!(state.title, "a");
        assert_eq!(state.location, "b");
        state.backspace();
        assert!(state.location.is_empty());
    }
}
