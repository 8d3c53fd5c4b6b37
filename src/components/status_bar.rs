use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme;

pub struct StatusBar;

impl StatusBar {
    /// One-line bar: mode indicator left, toast or key hints right.
    pub fn render(frame: &mut Frame, area: Rect, left: &str, toast: Option<&str>) {
        let w = area.width as usize;

        let right = if let Some(msg) = toast {
            format!(" {} ", msg)
        } else if w >= 80 {
            " hjkl:Nav [/]:Month t:Today Enter:Detail n:New d:Del x:Export ?:Help q:Quit"
                .to_string()
        } else if w >= 50 {
            " arrows:Nav n:New x:Export q:Quit".to_string()
        } else {
            " ?:Help q:Quit".to_string()
        };

        let left = format!(" {} ", left);
        let padding = pad_between(w, &left, &right);

        let line = Line::from(vec![
            Span::styled(left, theme::current().status),
            Span::styled(padding, theme::current().status),
            Span::styled(right, theme::current().status),
        ]);

        let bar = Paragraph::new(line).style(theme::current().status);
        frame.render_widget(bar, area);
    }
}

/// Spacer sized by character count, not byte length; toasts carry
/// free-form event titles.
fn pad_between(width: usize, left: &str, right: &str) -> String {
    " ".repeat(width.saturating_sub(left.chars().count() + right.chars().count()))
}
