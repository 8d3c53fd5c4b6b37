//! Month-grid PNG export. The grid is drawn into an off-screen terminal
//! buffer with the same widget used on screen, then rasterized glyph by
//! glyph with an 8x8 bitmap font. Rendering and encoding run on a worker
//! thread so the UI stays interactive; the image reflects the projection
//! as it stood when the export started.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;

use chrono::NaiveDate;
use image::{Rgb, RgbImage};
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::style::Color;
use ratatui::Terminal;
use thiserror::Error;

use crate::components::MonthView;
use crate::planner::grid::{month_label, month_name};
use crate::planner::Cell;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("image encode error: {0}")]
    Encode(#[from] image::ImageError),
}

/// Glyph cell footprint in pixels: 8x8 font rows doubled vertically to
/// match terminal cell proportions.
const GLYPH_W: u32 = 8;
const GLYPH_H: u32 = 16;

/// Off-screen grid dimensions in terminal cells.
const GRID_COLS: u16 = 7 * 16 + 2;
const CELL_ROWS: u16 = 5;

/// Deterministic artifact name: `calendar-<FullMonthName>-<Year>.png`.
pub fn export_path(dir: &Path, reference: NaiveDate) -> PathBuf {
    use chrono::Datelike;
    dir.join(format!(
        "calendar-{}-{}.png",
        month_name(reference.month()),
        reference.year()
    ))
}

/// Kick off an export of `cells` on a worker thread. The result arrives on
/// the returned channel; the caller polls it once per UI tick.
pub fn start_export(
    cells: Vec<Cell>,
    reference: NaiveDate,
    today: NaiveDate,
    dir: PathBuf,
) -> mpsc::Receiver<Result<PathBuf, ExportError>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = run_export(&cells, reference, today, &dir);
        if let Err(ref err) = result {
            tracing::warn!(error = %err, month = %month_label(reference), "export failed");
        }
        let _ = tx.send(result);
    });
    rx
}

fn run_export(
    cells: &[Cell],
    reference: NaiveDate,
    today: NaiveDate,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let buffer = render_grid(cells, reference, today);
    let image = rasterize(&buffer);
    let path = export_path(dir, reference);
    image.save(&path)?;
    Ok(path)
}

/// Draw the month grid into an off-screen buffer sized to the projection.
/// The test backend cannot fail.
fn render_grid(cells: &[Cell], reference: NaiveDate, today: NaiveDate) -> Buffer {
    let weeks = cells.len().div_ceil(7).max(1) as u16;
    let rows = 1 + weeks * CELL_ROWS + 2;

    let mut terminal =
        Terminal::new(TestBackend::new(GRID_COLS, rows)).expect("off-screen terminal");
    terminal
        .draw(|frame| {
            // No selection highlight in the artifact; today keeps its marker.
            MonthView::render(frame, frame.area(), cells, reference, NaiveDate::MIN, today);
        })
        .expect("off-screen render");
    terminal.backend().buffer().clone()
}

/// Rasterize a terminal buffer onto a white canvas, one 8x16 pixel block
/// per cell.
fn rasterize(buffer: &Buffer) -> RgbImage {
    let area = buffer.area();
    let mut img = RgbImage::from_pixel(
        u32::from(area.width) * GLYPH_W,
        u32::from(area.height) * GLYPH_H,
        Rgb([255, 255, 255]),
    );

    for y in 0..area.height {
        for x in 0..area.width {
            let Some(cell) = buffer.cell((x, y)) else {
                continue;
            };
            let fg = color_rgb(cell.style().fg.unwrap_or(Color::Reset), Rgb([30, 30, 30]));
            let bg = color_rgb(cell.style().bg.unwrap_or(Color::Reset), Rgb([255, 255, 255]));
            let ch = cell.symbol().chars().next().unwrap_or(' ');
            draw_glyph(
                &mut img,
                u32::from(x) * GLYPH_W,
                u32::from(y) * GLYPH_H,
                ch,
                fg,
                bg,
            );
        }
    }

    img
}

fn draw_glyph(img: &mut RgbImage, px: u32, py: u32, ch: char, fg: Rgb<u8>, bg: Rgb<u8>) {
    let glyph = glyph_rows(ch);
    for (row, bits) in glyph.iter().enumerate() {
        for col in 0..8u32 {
            let on = bits & (1 << col) != 0;
            let color = if on { fg } else { bg };
            // Each font row covers two pixel rows.
            let base_y = py + row as u32 * 2;
            img.put_pixel(px + col, base_y, color);
            img.put_pixel(px + col, base_y + 1, color);
        }
    }
}

fn glyph_rows(ch: char) -> [u8; 8] {
    let idx = ch as usize;
    if idx < 128 {
        font8x8::legacy::BASIC_LEGACY[idx]
    } else {
        // Non-ASCII (truncation ellipsis and the like) degrades to a dot.
        font8x8::legacy::BASIC_LEGACY[b'.' as usize]
    }
}

fn color_rgb(color: Color, reset: Rgb<u8>) -> Rgb<u8> {
    match color {
        Color::Reset => reset,
        Color::Black => Rgb([0, 0, 0]),
        Color::Red => Rgb([205, 49, 49]),
        Color::Green => Rgb([13, 188, 121]),
        Color::Yellow => Rgb([229, 229, 16]),
        Color::Blue => Rgb([36, 114, 200]),
        Color::Magenta => Rgb([188, 63, 188]),
        Color::Cyan => Rgb([17, 168, 205]),
        Color::White => Rgb([229, 229, 229]),
        Color::Gray => Rgb([160, 160, 160]),
        Color::DarkGray => Rgb([102, 102, 102]),
        Color::LightRed => Rgb([241, 76, 76]),
        Color::LightGreen => Rgb([35, 209, 139]),
        Color::LightYellow => Rgb([245, 245, 67]),
        Color::LightBlue => Rgb([59, 142, 234]),
        Color::LightMagenta => Rgb([214, 112, 214]),
        Color::LightCyan => Rgb([41, 184, 219]),
        Color::Rgb(r, g, b) => Rgb([r, g, b]),
        Color::Indexed(_) => reset,
    }
}
