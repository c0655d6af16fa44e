//! Drawing: the board as a pixel surface packed into half-block cells, and the reset fade.

use passivetris::{Rgb, Simulation, Tones};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Length of the fade-in after the board starts over.
pub const RESET_FADE_MS: u32 = 400;

/// Blocks narrower than this are drawn in their outer shade only.
const MIDDLE_MIN_SIZE: u16 = 3;
const INNER_MIN_SIZE: u16 = 7;

/// Widths of the two outer shades, each as a fraction of half a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shading {
    pub outer: f32,
    pub middle: f32,
}

impl Default for Shading {
    fn default() -> Self {
        Self {
            outer: 0.33,
            middle: 0.33,
        }
    }
}

impl Shading {
    /// Shade of pixel `(lx, ly)` inside a `size` x `size` block, or `None` if nothing paints it.
    pub fn tone_at(&self, tones: &Tones, lx: u16, ly: u16, size: u16) -> Option<Rgb> {
        let s = f32::from(size);
        let (px, py) = (f32::from(lx) + 0.5, f32::from(ly) + 0.5);
        let depth = px.min(s - px).min(py).min(s - py);
        let outer_margin = s / 2.0 * self.outer;
        let inner_margin = outer_margin + s / 2.0 * self.middle;
        if size >= INNER_MIN_SIZE && depth > inner_margin {
            Some(tones.inner)
        } else if size >= MIDDLE_MIN_SIZE && depth > outer_margin {
            Some(tones.middle)
        } else if self.outer > 0.0 {
            Some(tones.outer)
        } else {
            None
        }
    }
}

/// Host drawing options.
#[derive(Debug, Clone, Copy)]
pub struct View {
    pub background: Color,
    pub shading: Shading,
}

/// Pixels of the board, row-major; `None` shows the background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: usize,
    height: usize,
    pixels: Vec<Option<Rgb>>,
}

impl Surface {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![None; width * height],
        }
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Rgb> {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            None
        }
    }

    /// Paint grid cell `(col, row)`. Pixels off the surface are clipped.
    fn paint_block(&mut self, col: i32, row: i32, size: u16, tones: &Tones, shading: Shading) {
        let (ox, oy) = (i64::from(col) * i64::from(size), i64::from(row) * i64::from(size));
        for ly in 0..size {
            let y = oy + i64::from(ly);
            if y < 0 || y >= self.height as i64 {
                continue;
            }
            for lx in 0..size {
                let x = ox + i64::from(lx);
                if x < 0 || x >= self.width as i64 {
                    continue;
                }
                if let Some(rgb) = shading.tone_at(tones, lx, ly, size) {
                    self.pixels[y as usize * self.width + x as usize] = Some(rgb);
                }
            }
        }
    }
}

/// Pile first, then the falling block on top. Rows of the block still above the grid are skipped.
pub fn rasterize(sim: &Simulation, width: usize, height: usize, shading: Shading) -> Surface {
    let mut surface = Surface::new(width, height);
    let size = sim.config().cell_size;
    if let Some(grid) = sim.grid() {
        grid.for_each_occupied(|x, y, tones| {
            surface.paint_block(x as i32, y as i32, size, tones, shading);
        });
    }
    if let Some(block) = sim.active() {
        let tones = block.shape.tones;
        for (x, y) in block.cells().filter(|&(_, y)| y >= 0) {
            surface.paint_block(x, y, size, &tones, shading);
        }
    }
    surface
}

/// Board area inside the border.
pub fn board_area(area: Rect) -> Rect {
    Block::default().borders(Borders::ALL).inner(area)
}

/// Pixel size of the surface behind `board`: one pixel per column, two per row.
pub fn surface_size(board: Rect) -> (u32, u32) {
    (u32::from(board.width), u32::from(board.height) * 2)
}

const fn to_color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Draw border, title and board, then run the reset fade if one is active.
pub fn draw(
    frame: &mut Frame,
    sim: &Simulation,
    view: &View,
    reset_effect: &mut Option<Effect>,
    effect_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let area = frame.area();
    let title = Line::from(vec![
        Span::raw(" passivetris ").bold(),
        Span::raw(format!(
            "| lines: {} | level: {} ",
            sim.lines_cleared(),
            sim.level()
        )),
    ]);
    let hint = Line::from(" q quit  r restart  f fill ").right_aligned().dim();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().bg(view.background))
        .title(title)
        .title_bottom(hint);
    let board = block.inner(area);
    block.render(area, frame.buffer_mut());

    let (px_w, px_h) = surface_size(board);
    let surface = rasterize(sim, px_w as usize, px_h as usize, view.shading);
    let pixel = |x: usize, y: usize| surface.get(x, y).map_or(view.background, to_color);

    let buf = frame.buffer_mut();
    for row in 0..board.height {
        for col in 0..board.width {
            let (x, y) = (usize::from(col), usize::from(row) * 2);
            buf[(board.x + col, board.y + row)]
                .set_symbol("▀")
                .set_style(Style::default().fg(pixel(x, y)).bg(pixel(x, y + 1)));
        }
    }

    apply_reset_effect(frame, board, view, reset_effect, effect_process_time, now);
}

/// Fade the board in from the background (TachyonFX), advancing by the time since last frame.
fn apply_reset_effect(
    frame: &mut Frame,
    board: Rect,
    view: &View,
    reset_effect: &mut Option<Effect>,
    effect_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let Some(effect) = reset_effect else {
        *effect_process_time = None;
        return;
    };
    let delta = effect_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u128::from(u32::MAX)) as u32;
    *effect_process_time = Some(now);
    frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
}

/// New reset fade over the board region of `area`.
pub fn reset_fade(area: Rect, view: &View) -> Effect {
    let bg = match view.background {
        Color::Reset => Color::Black,
        c => c,
    };
    fx::fade_from(bg, bg, (RESET_FADE_MS, Interpolation::QuadOut)).with_area(board_area(area))
}
