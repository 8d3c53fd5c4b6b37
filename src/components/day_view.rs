use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::planner::Event;
use crate::theme;

/// Event list for the selected day, with a movable selection used to open
/// the detail popup and to pick the delete target.
pub struct DayView;

impl DayView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        date: NaiveDate,
        events: &[Event],
        selected: usize,
    ) {
        let w = area.width as usize;

        let title = if w >= 30 {
            format!(" {} ", date.format("%A, %B %d, %Y"))
        } else if w >= 18 {
            format!(" {} ", date.format("%b %d, %Y"))
        } else {
            format!(" {} ", date.format("%m/%d"))
        };

        let count_str = if events.is_empty() {
            String::new()
        } else {
            let n = events.len();
            format!(" {} event{} ", n, if n == 1 { "" } else { "s" })
        };

        let block = Block::default()
            .title(title)
            .title_style(theme::current().accent)
            .title_bottom(Line::from(Span::styled(count_str, theme::current().dim)))
            .borders(Borders::ALL)
            .border_style(theme::current().border);

        if events.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("No events").style(theme::current().dim);
            frame.render_widget(msg, inner);
            return;
        }

        let inner_w = area.width.saturating_sub(2) as usize;
        let items: Vec<ListItem> = events
            .iter()
            .enumerate()
            .map(|(i, ev)| format_event(ev, inner_w, i == selected))
            .collect();

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }
}

fn format_event(ev: &Event, max_width: usize, selected: bool) -> ListItem<'static> {
    let marker = if selected { "> " } else { "  " };
    let time_span = Span::styled(
        format!("{} ", ev.time),
        Style::default().add_modifier(Modifier::DIM),
    );
    let title_style = if selected {
        theme::current().selected
    } else {
        theme::current().event
    };
    let title_span = Span::styled(ev.title.clone(), title_style);

    let mut spans = vec![Span::raw(marker.to_string()), time_span, title_span];

    // Only show location if there's room
    let used = 2 + ev.time.len() + 1 + ev.title.len();
    if used + 4 + ev.location.len() <= max_width {
        spans.push(Span::styled(
            format!(" @ {}", ev.location),
            theme::current().dim,
        ));
    }

    ListItem::new(Line::from(spans))
}

/// Full-detail popup for one event: title, date, time, location and the
/// creation timestamp, plus the delete action.
pub fn render_detail_popup(frame: &mut Frame, area: Rect, ev: &Event) {
    let popup_w = area.width.min(60).max(30);
    let popup_h = area.height.min(12).max(8);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(format!(" {} ", ev.title))
        .title_style(theme::current().accent)
        .borders(Borders::ALL)
        .border_style(theme::current().accent);

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let lines = vec![
        Line::from(vec![
            Span::styled("Date:     ", theme::current().dim),
            Span::styled(ev.date.format("%A, %B %d, %Y").to_string(), Style::default()),
        ]),
        Line::from(vec![
            Span::styled("Time:     ", theme::current().dim),
            Span::styled(ev.time.clone(), Style::default()),
        ]),
        Line::from(vec![
            Span::styled("Location: ", theme::current().dim),
            Span::styled(ev.location.clone(), Style::default()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Created:  ", theme::current().dim),
            Span::styled(
                ev.created_at.format("%Y-%m-%d %H:%M").to_string(),
                theme::current().dim,
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("d", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Delete  ", theme::current().dim),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Close", theme::current().dim),
        ]),
    ];

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
