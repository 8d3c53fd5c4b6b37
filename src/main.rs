mod app;
mod components;
mod export;
mod planner;
mod term;
mod theme;

use std::fs;
use std::time::Duration;

use app::{App, InputMode};
use color_eyre::eyre::{eyre, Result};
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use tracing_subscriber::EnvFilter;

use planner::EventStore;

fn main() -> Result<()> {
    color_eyre::install()?;

    let data_dir = dirs::data_dir()
        .ok_or_else(|| eyre!("no data directory on this platform"))?
        .join("planner-tui");
    fs::create_dir_all(&data_dir)?;
    init_logging(&data_dir)?;

    let store = EventStore::open(data_dir.join("events.json"))?;
    let export_dir = std::env::current_dir()?;
    let mut app = App::new(store, export_dir);

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = term::restore();
        original_hook(panic_info);
    }));

    let mut terminal = term::init()?;
    let result = run(&mut terminal, &mut app);
    term::restore()?;
    result
}

/// Logs go to a file so diagnostics never bleed into the alternate screen.
fn init_logging(data_dir: &std::path::Path) -> Result<()> {
    let log_file = fs::File::create(data_dir.join("planner.log"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::sync::Arc::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(terminal: &mut term::Tui, app: &mut App) -> Result<()> {
    while app.running {
        app.tick();

        terminal.draw(|frame| {
            let area = frame.area();

            // Main layout: content + status bar
            let layout =
                Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
            render_month_layout(frame, layout[0], app);

            if let Some(ref form) = app.form_state {
                components::EventForm::render(frame, area, form);
            }

            if let Some(ref ev) = app.detail {
                components::day_view::render_detail_popup(frame, area, ev);
            }

            if app.show_help {
                render_help(frame, area);
            }

            let mode = match app.input_mode {
                InputMode::Normal => "Planner",
                InputMode::Form => "Planner [New Event]",
            };
            components::StatusBar::render(frame, layout[1], mode, app.toast());
        })?;

        if let Some(key) = term::next_key(Duration::from_millis(100))? {
            // Help overlay takes priority
            if app.show_help {
                if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
                    app.show_help = false;
                }
                continue;
            }

            // Detail popup takes priority
            if app.detail.is_some() {
                match key.code {
                    KeyCode::Esc => app.close_detail(),
                    KeyCode::Char('d') => app.delete_detail_event(),
                    _ => {}
                }
                continue;
            }

            match app.input_mode {
                InputMode::Form => handle_form_input(app, key.code),
                InputMode::Normal => handle_normal_input(app, key.code, key.modifiers),
            }
        }
    }

    Ok(())
}

fn handle_normal_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
        }
        (KeyCode::Char('t'), _) => app.go_to_today(),
        (KeyCode::Char('n'), _) => app.open_event_form(),
        (KeyCode::Char('d'), _) => app.delete_selected_event(),
        (KeyCode::Char('x'), _) => app.start_export(),
        (KeyCode::Enter, _) => app.show_detail(),
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => app.prev_day(),
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => app.next_day(),
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.select_prev_event(),
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.select_next_event(),
        (KeyCode::PageUp, _) | (KeyCode::Char('K'), _) => app.prev_week(),
        (KeyCode::PageDown, _) | (KeyCode::Char('J'), _) => app.next_week(),
        (KeyCode::Char('['), _) => app.prev_month(),
        (KeyCode::Char(']'), _) => app.next_month(),
        (KeyCode::Char('?'), _) => app.show_help = true,
        _ => {}
    }
}

fn handle_form_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.close_event_form(),
        KeyCode::Enter => app.submit_event_form(),
        KeyCode::Tab => app.form_tab(),
        KeyCode::BackTab => app.form_backtab(),
        KeyCode::Backspace => app.form_backspace(),
        KeyCode::Char(c) => app.form_input_char(c),
        _ => {}
    }
}

fn render_month_layout(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    if area.width < 70 {
        components::MonthView::render(
            frame,
            area,
            &app.cells,
            app.reference_date,
            app.selected_date,
            app.today,
        );
    } else {
        let content =
            Layout::horizontal([Constraint::Min(50), Constraint::Length(36)]).split(area);

        components::MonthView::render(
            frame,
            content[0],
            &app.cells,
            app.reference_date,
            app.selected_date,
            app.today,
        );

        components::DayView::render(
            frame,
            content[1],
            app.selected_date,
            &app.day_events,
            app.selected_event,
        );
    }
}

fn render_help(frame: &mut ratatui::Frame, area: Rect) {
    use ratatui::style::{Modifier, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

    let popup_w = area.width.min(52).max(30);
    let popup_h = area.height.min(20).max(12);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Keybindings ")
        .title_style(theme::current().accent)
        .borders(Borders::ALL)
        .border_style(theme::current().accent);

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default()
        .fg(ratatui::style::Color::Cyan)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default();
    let section_style = theme::current().header.add_modifier(Modifier::UNDERLINED);

    let lines = vec![
        Line::from(Span::styled("Navigation", section_style)),
        Line::from(vec![
            Span::styled("  h/l ", key_style),
            Span::styled("or ", theme::current().dim),
            Span::styled("\u{2190}/\u{2192}  ", key_style),
            Span::styled("Previous/next day", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  J/K       ", key_style),
            Span::styled("Previous/next week", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  [/]       ", key_style),
            Span::styled("Previous/next month", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  t         ", key_style),
            Span::styled("Jump to today", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("Events", section_style)),
        Line::from(vec![
            Span::styled("  j/k ", key_style),
            Span::styled("or ", theme::current().dim),
            Span::styled("\u{2191}/\u{2193}  ", key_style),
            Span::styled("Select event in day list", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  Enter     ", key_style),
            Span::styled("View event details", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  n         ", key_style),
            Span::styled("Create new event", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  d         ", key_style),
            Span::styled("Delete selected event", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("Other", section_style)),
        Line::from(vec![
            Span::styled("  x         ", key_style),
            Span::styled("Export month as PNG", desc_style),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  q", key_style),
            Span::styled(" / ", theme::current().dim),
            Span::styled("Esc     ", key_style),
            Span::styled("Quit / close popup", desc_style),
        ]),
    ];

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
