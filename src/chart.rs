// 📈 Speed Chart Renderer
// Draws the ranked animal-speed bar chart into a terminal area. Geometry
// is computed on an abstract canvas (600x400-unit minimum, fixed margins)
// and projected onto the cell grid, so the layout holds its shape even in
// a collapsed container.

use crate::ingest::{AnimalRecord, Diet};
use crate::scale::{BandScale, LinearScale};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

const MIN_WIDTH: f64 = 600.0;
const MIN_HEIGHT: f64 = 400.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_RIGHT: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 80.0;
const MARGIN_LEFT: f64 = 100.0;
const BAND_PADDING: f64 = 0.15;
const TICK_COUNT: usize = 8;

// Measured container size in canvas units
const UNITS_PER_COL: f64 = 10.0;
const UNITS_PER_ROW: f64 = 25.0;

// Legend block sits inside the top-right plot area
const LEGEND_INSET: f64 = 140.0;
const LEGEND_ROW_STEP: f64 = 18.0;

/// Fixed three-color diet mapping, shared by bars and legend.
pub fn diet_color(diet: Diet) -> Color {
    match diet {
        Diet::Carnivore => Color::Red,
        Diet::Herbivore => Color::Green,
        Diet::Omnivore => Color::Blue,
    }
}

// ============================================================================
// WIDGET
// ============================================================================

/// Bar chart over a ranked record list.
///
/// Idempotent per render: the whole area is cleared before drawing, so a
/// repeated render leaves exactly one chart. An empty record list clears
/// the area and draws nothing - no axes, no legend. The widget performs no
/// data validation; it trusts the ingestion contract.
pub struct SpeedChart<'a> {
    records: &'a [AnimalRecord],
}

impl<'a> SpeedChart<'a> {
    pub fn new(records: &'a [AnimalRecord]) -> Self {
        SpeedChart { records }
    }
}

impl Widget for SpeedChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Clear previous content first: repeated renders must not stack
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                buf.get_mut(x, y).reset();
            }
        }

        if self.records.is_empty() || area.width < 2 || area.height < 2 {
            return;
        }

        let canvas_w = (f64::from(area.width) * UNITS_PER_COL).max(MIN_WIDTH);
        let canvas_h = (f64::from(area.height) * UNITS_PER_ROW).max(MIN_HEIGHT);

        let x_scale = BandScale::new(
            self.records.iter().map(|r| r.name.as_str()),
            MARGIN_LEFT,
            canvas_w - MARGIN_RIGHT,
            BAND_PADDING,
        );

        let speed_max = self.records.iter().map(|r| r.speed).fold(0.0, f64::max);
        let y_scale = LinearScale::new(
            0.0,
            speed_max,
            canvas_h - MARGIN_BOTTOM, // bottom margin = zero
            MARGIN_TOP,               // top margin = maximum
        )
        .nice(TICK_COUNT);

        // unit -> cell projection
        let col = |ux: f64| -> i32 { i32::from(area.x) + (ux / canvas_w * f64::from(area.width)) as i32 };
        let row = |uy: f64| -> i32 { i32::from(area.y) + (uy / canvas_h * f64::from(area.height)) as i32 };

        let axis_col = col(MARGIN_LEFT);
        let right_col = col(canvas_w - MARGIN_RIGHT);
        let top_row = row(MARGIN_TOP);
        let bottom_row = row(canvas_h - MARGIN_BOTTOM);

        // Base axis lines
        for y in top_row..bottom_row {
            put_cell(buf, area, axis_col, y, "│", Color::Gray);
        }
        for x in axis_col..=right_col {
            put_cell(buf, area, x, bottom_row, "─", Color::Gray);
        }
        put_cell(buf, area, axis_col, bottom_row, "└", Color::Gray);

        // Y tick labels
        for tick in y_scale.ticks(TICK_COUNT) {
            let y = row(y_scale.scale(tick));
            if y < top_row || y > bottom_row {
                continue;
            }
            if y < bottom_row {
                put_cell(buf, area, axis_col, y, "┤", Color::Gray);
            }
            let label = fmt_tick(tick);
            let x = axis_col - label.len() as i32 - 1;
            put_str(buf, area, x, y, &label, Style::default().fg(Color::Gray));
        }

        // Bars: one rectangle per record, top at its speed, bottom at zero.
        // Duplicate names share a band; later bars overdraw earlier ones.
        for record in self.records {
            let Some(band_x) = x_scale.position(&record.name) else {
                continue;
            };
            if record.speed <= 0.0 {
                continue; // zero-height rectangle
            }

            let c0 = col(band_x);
            let c1 = col(band_x + x_scale.bandwidth()).max(c0 + 1);
            let mut r0 = row(y_scale.scale(record.speed));
            if r0 >= bottom_row {
                r0 = bottom_row - 1; // at least one row for any positive speed
            }

            let color = diet_color(record.diet);
            for y in r0..bottom_row {
                for x in c0..c1 {
                    put_cell(buf, area, x, y, "█", color);
                }
            }
        }

        // X category labels, centered under each band
        for name in x_scale.names() {
            let Some(band_x) = x_scale.position(name) else {
                continue;
            };
            let c0 = col(band_x);
            let c1 = col(band_x + x_scale.bandwidth()).max(c0 + 1);
            let width = (c1 - c0).max(1) as usize;
            let label = truncate_label(name, width);
            let x = c0 + (width as i32 - label.len() as i32) / 2;
            put_str(buf, area, x, bottom_row + 1, &label, Style::default().fg(Color::White));
        }

        // Axis captions
        let x_caption = "Animal";
        let caption_row = row(canvas_h - 20.0).max(bottom_row + 2);
        let caption_col = (axis_col + right_col) / 2 - x_caption.len() as i32 / 2;
        put_str(
            buf,
            area,
            caption_col,
            caption_row,
            x_caption,
            Style::default().fg(Color::White),
        );

        let y_caption = "Speed (km/h)";
        let plot_height = (bottom_row - top_row).max(0) as usize;
        let start = top_row + ((plot_height.saturating_sub(y_caption.len())) / 2) as i32;
        for (i, ch) in y_caption.chars().enumerate() {
            let y = start + i as i32;
            if y >= bottom_row {
                break;
            }
            put_str(
                buf,
                area,
                col(20.0),
                y,
                &ch.to_string(),
                Style::default().fg(Color::White),
            );
        }

        // Legend: fixed three diet categories, top-right plot area
        let legend_col = col(canvas_w - MARGIN_RIGHT - LEGEND_INSET);
        let mut prev_row = i32::MIN;
        for (i, diet) in Diet::ALL.iter().enumerate() {
            let y = row(MARGIN_TOP + i as f64 * LEGEND_ROW_STEP).max(prev_row + 1);
            prev_row = y;
            put_cell(buf, area, legend_col, y, "■", diet_color(*diet));
            put_str(
                buf,
                area,
                legend_col + 2,
                y,
                diet.label(),
                Style::default().fg(Color::White),
            );
        }
    }
}

// ============================================================================
// DRAWING HELPERS
// ============================================================================

/// Write one symbol, clipped to the widget area.
fn put_cell(buf: &mut Buffer, area: Rect, x: i32, y: i32, symbol: &str, color: Color) {
    if x < i32::from(area.left())
        || x >= i32::from(area.right())
        || y < i32::from(area.top())
        || y >= i32::from(area.bottom())
    {
        return;
    }
    buf.get_mut(x as u16, y as u16)
        .set_symbol(symbol)
        .set_fg(color);
}

/// Write a string, clipped character-by-character to the widget area.
fn put_str(buf: &mut Buffer, area: Rect, x: i32, y: i32, s: &str, style: Style) {
    if y < i32::from(area.top()) || y >= i32::from(area.bottom()) {
        return;
    }
    for (i, ch) in s.chars().enumerate() {
        let cx = x + i as i32;
        if cx < i32::from(area.left()) || cx >= i32::from(area.right()) {
            continue;
        }
        buf.get_mut(cx as u16, y as u16)
            .set_symbol(&ch.to_string())
            .set_style(style);
    }
}

fn fmt_tick(v: f64) -> String {
    if v == v.trunc() {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

fn truncate_label(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        s.chars().take(max_len).collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================
