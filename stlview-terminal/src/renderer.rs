/// ASCII rasterizer for terminal rendering
///
/// Triangles arrive already sorted back to front, so they are filled in the
/// order given and later triangles simply overwrite earlier ones. There is
/// no depth buffer.
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use stlview_core::{Frame, Rgba, ScreenTriangle};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Viewport pixels covered by one terminal cell. Cells are about twice as
/// tall as they are wide.
pub const CELL_WIDTH_PX: f32 = 8.0;
pub const CELL_HEIGHT_PX: f32 = 16.0;

const EMPTY_MESSAGE: &str = "Model empty.";

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    ch: char,
    color: Color,
}

impl Cell {
    const BLANK: Cell = Cell {
        ch: ' ',
        color: Color::Reset,
    };
}

/// Character-cell framebuffer
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.cells = vec![Cell::BLANK; width * height];
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    pub fn render_frame(&mut self, frame: &Frame) {
        match frame {
            Frame::Empty => self.render_placeholder(),
            Frame::Triangles(triangles) => {
                for triangle in triangles {
                    self.render_triangle(triangle);
                }
            }
        }
    }

    /// Character at a cell, for inspection
    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x].ch)
    }

    fn render_placeholder(&mut self) {
        let row = self.height / 2;
        let start = self.width.saturating_sub(EMPTY_MESSAGE.len()) / 2;
        for (i, ch) in EMPTY_MESSAGE.chars().enumerate() {
            let x = start + i;
            if x < self.width && row < self.height {
                self.cells[row * self.width + x] = Cell {
                    ch,
                    color: Color::Red,
                };
            }
        }
    }

    fn render_triangle(&mut self, triangle: &ScreenTriangle) {
        // Screen pixels to cell units
        let coords = triangle
            .vertices
            .map(|v| (v.x / CELL_WIDTH_PX, v.y / CELL_HEIGHT_PX));
        let character = luminosity_char(triangle.intensity);
        let colors = triangle.vertices.map(|v| v.color);

        self.rasterize_triangle(&coords, &colors, character);
    }

    fn rasterize_triangle(
        &mut self,
        coords: &[(f32, f32); 3],
        colors: &[Rgba; 3],
        character: char,
    ) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) = barycentric(v0, v1, v2, (px, py)) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let color = blend(colors, (w0, w1, w2));
                        let idx = y as usize * self.width + x as usize;
                        self.cells[idx] = Cell {
                            ch: character,
                            color: to_terminal_color(&color),
                        };
                    }
                }
            }
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            for x in 0..self.width {
                let cell = self.cells[y * self.width + x];
                writer.queue(SetForegroundColor(cell.color))?;
                writer.queue(Print(cell.ch))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn luminosity_char(intensity: f32) -> char {
    let last = LUMINOSITY_RAMP.len() - 1;
    let index = (intensity.clamp(0.0, 1.0) * last as f32).round() as usize;
    LUMINOSITY_RAMP[index.min(last)]
}

fn blend(colors: &[Rgba; 3], (w0, w1, w2): (f32, f32, f32)) -> Rgba {
    let mix = |f: fn(&Rgba) -> f32| w0 * f(&colors[0]) + w1 * f(&colors[1]) + w2 * f(&colors[2]);
    Rgba::new(mix(|c| c.r), mix(|c| c.g), mix(|c| c.b), mix(|c| c.a))
}

fn to_terminal_color(color: &Rgba) -> Color {
    let (r, g, b) = color.to_rgb8();
    Color::Rgb { r, g, b }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
