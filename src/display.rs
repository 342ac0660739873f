//! Character-grid rendering.
//!
//! The engine never talks to a terminal directly. It draws through a
//! [`Canvas`], which maps world positions into the camera view and forwards
//! in-range cells to a [`RenderBackend`]. Writes that fall outside the grid
//! are dropped silently.

use crate::error::Result;
use crate::geometry::{BoundingBox, Vector};
use crate::resources::color::ColorPair;
use crate::utils::world_to_view;
use std::io::Write;
use tracing::info;

/// Default display size in characters
pub const DEFAULT_WIDTH: usize = 100;
pub const DEFAULT_HEIGHT: usize = 30;

/// Destination for composed frames
pub trait RenderBackend {
    fn start_up(&mut self) -> Result<()> {
        Ok(())
    }

    fn shut_down(&mut self) -> Result<()> {
        Ok(())
    }

    /// Width in characters
    fn width(&self) -> usize;

    /// Height in characters
    fn height(&self) -> usize;

    /// Blank the back buffer
    fn clear(&mut self);

    /// Write one cell of the back buffer; callers guarantee `x < width`, `y < height`
    fn put_cell(&mut self, x: usize, y: usize, ch: char, color: ColorPair);

    /// Present the back buffer
    fn render(&mut self) -> Result<()>;
}

/// Camera-relative drawing surface for one frame
pub struct Canvas<'a> {
    backend: &'a mut dyn RenderBackend,
    view: BoundingBox,
}

impl<'a> Canvas<'a> {
    pub fn new(backend: &'a mut dyn RenderBackend, view: BoundingBox) -> Self {
        Self { backend, view }
    }

    pub fn view(&self) -> &BoundingBox {
        &self.view
    }

    /// Draw a character at a world position
    pub fn draw_character(&mut self, world_position: Vector, ch: char, color: ColorPair) {
        let screen = world_to_view(world_position, &self.view);
        self.draw_in_view(screen, ch, color);
    }

    /// Draw a character at a view-relative position (HUD overlays)
    pub fn draw_in_view(&mut self, screen: Vector, ch: char, color: ColorPair) {
        let (x, y) = (screen.x.floor(), screen.y.floor());
        if x < 0.0 || y < 0.0 {
            return;
        }
        let (x, y) = (x as usize, y as usize);
        if x < self.backend.width() && y < self.backend.height() {
            self.backend.put_cell(x, y, ch, color);
        }
    }

    /// Draw a string left to right starting at a world position
    pub fn draw_string(&mut self, world_position: Vector, text: &str, color: ColorPair) {
        for (offset, ch) in text.chars().enumerate() {
            self.draw_character(world_position + Vector::new(offset as f32, 0.0), ch, color);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    ch: char,
    color: ColorPair,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            color: ColorPair::default(),
        }
    }
}

/// Fixed-size grid of coloured cells
#[derive(Clone, Debug)]
pub struct ScreenBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl ScreenBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::default(); width * height],
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::default());
    }

    pub fn set(&mut self, x: usize, y: usize, ch: char, color: ColorPair) {
        if let Some(cell) = self.cells.get_mut(y * self.width + x) {
            *cell = Cell { ch, color };
        }
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        if x >= self.width {
            return None;
        }
        self.cells.get(y * self.width + x).map(|cell| cell.ch)
    }

    pub fn color_at(&self, x: usize, y: usize) -> Option<ColorPair> {
        if x >= self.width {
            return None;
        }
        self.cells.get(y * self.width + x).map(|cell| cell.color)
    }

    /// One row as plain text
    pub fn row(&self, y: usize) -> String {
        self.cells
            .iter()
            .skip(y * self.width)
            .take(self.width)
            .map(|cell| cell.ch)
            .collect()
    }

    /// Write the grid with colour escapes, one line per row
    pub fn write_ansi<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            let mut current: Option<ColorPair> = None;
            for cell in &self.cells[y * self.width..(y + 1) * self.width] {
                if current != Some(cell.color) {
                    out.write_all(cell.color.ansi().as_bytes())?;
                    current = Some(cell.color);
                }
                let mut utf8 = [0u8; 4];
                out.write_all(cell.ch.encode_utf8(&mut utf8).as_bytes())?;
            }
            out.write_all(ColorPair::RESET.as_bytes())?;
            out.write_all(b"\r\n")?;
        }
        Ok(())
    }
}

/// Backend that keeps the last rendered frame in memory
#[derive(Clone, Debug)]
pub struct MemoryDisplay {
    back: ScreenBuffer,
    front: ScreenBuffer,
    frames_rendered: u64,
}

impl MemoryDisplay {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            back: ScreenBuffer::new(width, height),
            front: ScreenBuffer::new(width, height),
            frames_rendered: 0,
        }
    }

    /// Last presented frame
    pub fn screen(&self) -> &ScreenBuffer {
        &self.front
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }
}

impl Default for MemoryDisplay {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl RenderBackend for MemoryDisplay {
    fn width(&self) -> usize {
        self.back.width
    }

    fn height(&self) -> usize {
        self.back.height
    }

    fn clear(&mut self) {
        self.back.clear();
    }

    fn put_cell(&mut self, x: usize, y: usize, ch: char, color: ColorPair) {
        self.back.set(x, y, ch, color);
    }

    fn render(&mut self) -> Result<()> {
        self.front.clone_from(&self.back);
        self.frames_rendered += 1;
        Ok(())
    }
}

/// ANSI terminal backend writing whole frames to `W`
pub struct TerminalDisplay<W: Write> {
    out: W,
    buffer: ScreenBuffer,
    started: bool,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W, width: usize, height: usize) -> Self {
        Self {
            out,
            buffer: ScreenBuffer::new(width, height),
            started: false,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl TerminalDisplay<std::io::Stdout> {
    pub fn stdout(width: usize, height: usize) -> Self {
        Self::new(std::io::stdout(), width, height)
    }
}

const CLEAR_SCREEN: &str = "\x1b[2J";
const CURSOR_HOME: &str = "\x1b[H";
const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

impl<W: Write> RenderBackend for TerminalDisplay<W> {
    fn start_up(&mut self) -> Result<()> {
        write!(self.out, "{HIDE_CURSOR}{CLEAR_SCREEN}")?;
        self.out.flush()?;
        self.started = true;
        info!(
            width = self.buffer.width,
            height = self.buffer.height,
            "terminal display started"
        );
        Ok(())
    }

    fn shut_down(&mut self) -> Result<()> {
        if self.started {
            write!(self.out, "{}{SHOW_CURSOR}", ColorPair::RESET)?;
            self.out.flush()?;
            self.started = false;
        }
        Ok(())
    }

    fn width(&self) -> usize {
        self.buffer.width
    }

    fn height(&self) -> usize {
        self.buffer.height
    }

    fn clear(&mut self) {
        self.buffer.clear();
    }

    fn put_cell(&mut self, x: usize, y: usize, ch: char, color: ColorPair) {
        self.buffer.set(x, y, ch, color);
    }

    fn render(&mut self) -> Result<()> {
        self.out.write_all(CURSOR_HOME.as_bytes())?;
        self.buffer.write_ansi(&mut self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::color::Color;

    #[test]
    fn test_canvas_maps_world_to_view() {
        let mut display = MemoryDisplay::new(10, 5);
        let view = BoundingBox::new(Vector::new(20.0, 10.0), 10.0, 5.0);
        {
            let mut canvas = Canvas::new(&mut display, view);
            canvas.draw_character(Vector::new(22.0, 11.0), '@', ColorPair::default());
        }
        display.render().unwrap();
        assert_eq!(display.screen().char_at(2, 1), Some('@'));
    }

    #[test]
    fn test_out_of_range_dropped() {
        let mut display = MemoryDisplay::new(4, 2);
        {
            let mut canvas = Canvas::new(&mut display, BoundingBox::new(Vector::ZERO, 4.0, 2.0));
            canvas.draw_character(Vector::new(-1.0, 0.0), 'x', ColorPair::default());
            canvas.draw_character(Vector::new(4.0, 0.0), 'x', ColorPair::default());
            canvas.draw_character(Vector::new(0.0, 2.0), 'x', ColorPair::default());
            canvas.draw_string(Vector::new(2.0, 1.0), "abc", ColorPair::default());
        }
        display.render().unwrap();
        assert_eq!(display.screen().row(0), "    ");
        assert_eq!(display.screen().row(1), "  ab");
    }

    #[test]
    fn test_render_swaps_buffers() {
        let mut display = MemoryDisplay::new(3, 1);
        display.put_cell(0, 0, 'a', ColorPair::new(Color::Red, Color::Black));
        assert_eq!(display.screen().row(0), "   ");
        display.render().unwrap();
        assert_eq!(display.screen().row(0), "a  ");
        assert_eq!(
            display.screen().color_at(0, 0),
            Some(ColorPair::new(Color::Red, Color::Black))
        );
        assert_eq!(display.frames_rendered(), 1);
    }

    #[test]
    fn test_terminal_writes_escapes() {
        let mut terminal = TerminalDisplay::new(Vec::new(), 2, 1);
        terminal.start_up().unwrap();
        terminal.put_cell(1, 0, '#', ColorPair::default());
        terminal.render().unwrap();
        terminal.shut_down().unwrap();

        let text = String::from_utf8(terminal.into_inner()).unwrap();
        assert!(text.contains(CURSOR_HOME));
        assert!(text.contains(" #"));
        assert!(text.ends_with(SHOW_CURSOR));
    }
}
