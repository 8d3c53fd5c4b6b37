use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::planner::grid::month_label;
use crate::planner::Cell;
use crate::theme;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Renders the projected month as a 7-column grid: weekday header, blank
/// padding cells, then one cell per day showing the day number and as many
/// event titles as fit (with a "+N" overflow marker).
pub struct MonthView;

impl MonthView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        cells: &[Cell],
        reference: NaiveDate,
        selected: NaiveDate,
        today: NaiveDate,
    ) {
        let block = Block::default()
            .title(format!(" {} ", month_label(reference)))
            .title_style(theme::current().accent)
            .borders(Borders::ALL)
            .border_style(theme::current().border);

        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.height < 2 || inner.width < 7 {
            return;
        }

        let weeks = cells.len().div_ceil(7).max(1);
        let mut constraints = vec![Constraint::Length(1)];
        constraints.extend(std::iter::repeat(Constraint::Fill(1)).take(weeks));
        let rows = Layout::vertical(constraints).split(inner);

        let header_cols = Layout::horizontal([Constraint::Fill(1); 7]).split(rows[0]);
        for (i, name) in DAY_NAMES.iter().enumerate() {
            let cell = Paragraph::new(Line::from(Span::styled(
                format!("{:^width$}", name, width = header_cols[i].width as usize),
                theme::current().accent,
            )));
            frame.render_widget(cell, header_cols[i]);
        }

        for (week, chunk) in cells.chunks(7).enumerate() {
            let cols = Layout::horizontal([Constraint::Fill(1); 7]).split(rows[week + 1]);
            for (col, cell) in chunk.iter().enumerate() {
                render_cell(frame, cols[col], cell, selected, today);
            }
        }
    }
}

fn render_cell(frame: &mut Frame, area: Rect, cell: &Cell, selected: NaiveDate, today: NaiveDate) {
    let Cell::Day { date, events, .. } = cell else {
        return;
    };
    if area.width == 0 || area.height == 0 {
        return;
    }

    let day_style = if *date == selected {
        theme::current().selected
    } else if *date == today {
        theme::current().today
    } else {
        Style::default()
    };

    let width = area.width as usize;
    let mut lines = vec![Line::from(Span::styled(format!("{:>2}", date.day()), day_style))];

    // One line per event; reserve the last visible line for an overflow
    // marker when not everything fits.
    let visible = area.height.saturating_sub(1) as usize;
    if visible > 0 && !events.is_empty() {
        let shown = if events.len() > visible {
            visible.saturating_sub(1)
        } else {
            events.len()
        };
        for ev in &events[..shown] {
            lines.push(Line::from(Span::styled(
                truncate(&ev.title, width),
                theme::current().event,
            )));
        }
        if shown < events.len() {
            lines.push(Line::from(Span::styled(
                format!("+{}", events.len() - shown),
                theme::current().dim,
            )));
        }
    }

    frame.render_widget(Paragraph::new(lines), area);
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_leaves_short_strings_alone() {
        assert_eq!(truncate("Standup", 10), "Standup");
        assert_eq!(truncate("Standup meeting", 8), "Standup…");
    }
}
