use crate::motion::Point;
use unicode_width::UnicodeWidthChar;

/// A 24-bit terminal color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub(crate) const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Blend toward `other`; `t = 0` is `self`, `t = 1` is `other`.
    pub(crate) fn mix(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb::new(channel(self.r, other.r), channel(self.g, other.g), channel(self.b, other.b))
    }
}

pub(crate) mod palette {
    use super::Rgb;

    pub(crate) const BACKGROUND: Rgb = Rgb::new(9, 9, 11);
    pub(crate) const IDLE: Rgb = Rgb::new(63, 63, 70);
    pub(crate) const MUTED_TEXT: Rgb = Rgb::new(113, 113, 122);
    pub(crate) const TEXT: Rgb = Rgb::new(228, 228, 231);
    pub(crate) const INDIGO: Rgb = Rgb::new(99, 102, 241);
    pub(crate) const BLUE: Rgb = Rgb::new(59, 130, 246);
    pub(crate) const LIGHT_BLUE: Rgb = Rgb::new(96, 165, 250);
    pub(crate) const EMERALD: Rgb = Rgb::new(16, 185, 129);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub ch: char,
    pub color: Rgb,
}

impl Default for Cell {
    fn default() -> Self {
        Self { ch: ' ', color: palette::BACKGROUND }
    }
}

/// Maps a diagram's view box onto a rectangle of terminal cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Viewport {
    pub left: f32,
    pub top: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Viewport {
    /// Fit a box `view_width` units wide into `columns` cells, keeping the aspect ratio of cells
    /// that are twice as tall as they are wide.
    pub(crate) fn fit(view_width: f32, left: u16, top: u16, columns: u16) -> Self {
        let scale_x = columns as f32 / view_width.max(1.0);
        Self { left: left as f32, top: top as f32, scale_x, scale_y: scale_x / 2.0 }
    }

    pub(crate) fn project(&self, point: Point) -> (i32, i32) {
        let column = self.left + point.x * self.scale_x;
        let row = self.top + point.y * self.scale_y;
        (column.round() as i32, row.round() as i32)
    }

    /// How many rows a view box of this height occupies.
    pub(crate) fn rows_for(&self, view_height: f32) -> f32 {
        view_height * self.scale_y
    }
}

/// An off-screen character grid, flushed to the terminal once per frame.
#[derive(Clone, Debug)]
pub(crate) struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Canvas {
    pub(crate) fn new(width: u16, height: u16) -> Self {
        Self { width, height, cells: vec![Cell::default(); width as usize * height as usize] }
    }

    #[cfg(test)]
    pub(crate) fn get(&self, column: u16, row: u16) -> Option<&Cell> {
        if column >= self.width || row >= self.height {
            return None;
        }
        self.cells.get(row as usize * self.width as usize + column as usize)
    }

    pub(crate) fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Set a cell; anything outside the grid is clipped.
    pub(crate) fn put(&mut self, column: i32, row: i32, ch: char, color: Rgb) {
        if column < 0 || row < 0 || column >= self.width as i32 || row >= self.height as i32 {
            return;
        }
        let index = row as usize * self.width as usize + column as usize;
        self.cells[index] = Cell { ch, color };
    }

    pub(crate) fn text(&mut self, column: i32, row: i32, text: &str, color: Rgb) {
        let mut column = column;
        for ch in text.chars() {
            self.put(column, row, ch, color);
            column += ch.width().unwrap_or(0).max(1) as i32;
        }
    }

    pub(crate) fn text_centered(&mut self, center: i32, row: i32, text: &str, color: Rgb) {
        let width = unicode_width::UnicodeWidthStr::width(text) as i32;
        self.text(center - width / 2, row, text, color);
    }

    pub(crate) fn frame(&mut self, (left, top): (i32, i32), (right, bottom): (i32, i32), color: Rgb) {
        if right <= left || bottom <= top {
            self.put(left, top, '■', color);
            return;
        }
        for column in left + 1..right {
            self.put(column, top, '─', color);
            self.put(column, bottom, '─', color);
        }
        for row in top + 1..bottom {
            self.put(left, row, '│', color);
            self.put(right, row, '│', color);
        }
        self.put(left, top, '╭', color);
        self.put(right, top, '╮', color);
        self.put(left, bottom, '╰', color);
        self.put(right, bottom, '╯', color);
    }

    /// Plot `path(t)` for `t` in `[0, 1]`, sampling densely enough to leave no gaps.
    pub(crate) fn trace<F>(&mut self, viewport: &Viewport, path: F, ch: char, color: Rgb)
    where
        F: Fn(f32) -> Point,
    {
        let (start_column, start_row) = viewport.project(path(0.0));
        let (end_column, end_row) = viewport.project(path(1.0));
        let span = (end_column - start_column).abs() + (end_row - start_row).abs();
        let samples = (span * 2).max(2);
        for sample in 0..=samples {
            let (column, row) = viewport.project(path(sample as f32 / samples as f32));
            self.put(column, row, ch, color);
        }
    }
}
