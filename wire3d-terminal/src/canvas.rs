/// Character canvas with clipped line drawing
use std::fmt;

use wire3d_core::{Color, Pixel, Resolution};

/// Character luminosity ramp (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are roughly twice as tall as they are wide, so each cell
/// covers two rows of virtual pixels.
pub const PIXELS_PER_ROW: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub color: Color,
}

/// A grid of terminal cells addressed through virtual pixels
pub struct Canvas {
    columns: usize,
    rows: usize,
    cells: Vec<Option<Cell>>,
}

impl Canvas {
    pub fn new(columns: usize, rows: usize) -> Self {
        let columns = columns.max(1);
        let rows = rows.max(1);
        Self {
            columns,
            rows,
            cells: vec![None; columns * rows],
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Virtual pixel size the camera should project to
    pub fn resolution(&self) -> Resolution {
        Resolution {
            width: self.columns as u32,
            height: (self.rows * PIXELS_PER_ROW) as u32,
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(None);
    }

    pub fn cell(&self, column: usize, row: usize) -> Option<Cell> {
        if column >= self.columns || row >= self.rows {
            return None;
        }
        self.cells[row * self.columns + column]
    }

    /// Plot a virtual pixel; out-of-bounds pixels are ignored
    pub fn plot(&mut self, x: i64, y: i64, cell: Cell) {
        if x < 0 || y < 0 {
            return;
        }
        let (column, row) = (x as usize, y as usize / PIXELS_PER_ROW);
        if column < self.columns && row < self.rows {
            self.cells[row * self.columns + column] = Some(cell);
        }
    }

    /// Draw a segment, clipped to the canvas, with a glyph picked from the
    /// color's brightness. Returns whether anything was drawn.
    pub fn draw_line(&mut self, start: Pixel, end: Pixel, color: Color) -> bool {
        let resolution = self.resolution();
        let max = (resolution.width as f32 - 1.0, resolution.height as f32 - 1.0);
        let Some((a, b)) = clip_to_rect((start.x(), start.y()), (end.x(), end.y()), max) else {
            return false;
        };

        let cell = Cell {
            glyph: glyph_for(color),
            color,
        };
        bresenham(
            (a.0.round() as i64, a.1.round() as i64),
            (b.0.round() as i64, b.1.round() as i64),
            |x, y| self.plot(x, y, cell),
        );
        true
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.columns) {
            let line: String = row.iter().map(|c| c.map_or(' ', |c| c.glyph)).collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}

/// Map a color to a ramp character, never the blank one
pub fn glyph_for(color: Color) -> char {
    let steps = (LUMINOSITY_RAMP.len() - 2) as f32;
    let index = 1 + (color.luminance() * steps).round() as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}

/// Liang-Barsky clip of a segment against `[0, max.0] x [0, max.1]`
///
/// Runs in f64: projected endpoints near the near plane can be huge.
fn clip_to_rect(
    a: (f32, f32),
    b: (f32, f32),
    max: (f32, f32),
) -> Option<((f64, f64), (f64, f64))> {
    let (ax, ay, bx, by) = (a.0 as f64, a.1 as f64, b.0 as f64, b.1 as f64);
    let (max_x, max_y) = (max.0 as f64, max.1 as f64);
    if ![ax, ay, bx, by].iter().all(|v| v.is_finite()) {
        return None;
    }

    let (dx, dy) = (bx - ax, by - ay);
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [(-dx, ax), (dx, max_x - ax), (-dy, ay), (dy, max_y - ay)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    Some(((ax + t0 * dx, ay + t0 * dy), (ax + t1 * dx, ay + t1 * dy)))
}

/// Integer line walk visiting both endpoints
fn bresenham(from: (i64, i64), to: (i64, i64), mut plot: impl FnMut(i64, i64)) {
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let sx = if x < to.0 { 1 } else { -1 };
    let sy = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        plot(x, y);
        if (x, y) == to {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
