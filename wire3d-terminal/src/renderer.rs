/// Wireframe renderer for the terminal
use crossterm::{
    cursor,
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use wire3d_core::{Camera, Color, Resolution, WireframeBuffers};

use crate::canvas::Canvas;

/// Edge counts for one rendered frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub edges: usize,
    /// Edges that survived near-plane clipping
    pub projected: usize,
    /// Projected edges that touched the canvas
    pub drawn: usize,
}

/// Draws projected edges into a character canvas and flushes it to a terminal
pub struct WireframeRenderer {
    canvas: Canvas,
}

impl WireframeRenderer {
    pub fn new(columns: usize, rows: usize) -> Self {
        Self {
            canvas: Canvas::new(columns, rows),
        }
    }

    pub fn resize(&mut self, columns: usize, rows: usize) {
        self.canvas = Canvas::new(columns, rows);
    }

    pub fn resolution(&self) -> Resolution {
        self.canvas.resolution()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn clear(&mut self) {
        self.canvas.clear();
    }

    pub fn render(&mut self, buffers: &WireframeBuffers, camera: &Camera) -> FrameStats {
        let mut stats = FrameStats {
            edges: buffers.edge_count(),
            ..FrameStats::default()
        };

        for (start, end, color) in buffers.segments() {
            let Some((a, b)) = camera.project_line_to_pixels(start, end) else {
                continue;
            };
            stats.projected += 1;
            if self.canvas.draw_line(a, b, color) {
                stats.drawn += 1;
            }
        }

        stats
    }

    /// Writes the canvas starting at terminal row `top`
    pub fn draw<W: Write>(&self, writer: &mut W, top: u16) -> std::io::Result<()> {
        let mut current = None;
        for row in 0..self.canvas.rows() {
            writer.queue(cursor::MoveTo(0, top + row as u16))?;
            for column in 0..self.canvas.columns() {
                match self.canvas.cell(column, row) {
                    Some(cell) => {
                        if current != Some(cell.color) {
                            writer.queue(SetForegroundColor(term_color(cell.color)))?;
                            current = Some(cell.color);
                        }
                        writer.queue(Print(cell.glyph))?;
                    }
                    None => {
                        writer.queue(Print(' '))?;
                    }
                }
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn term_color(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}
