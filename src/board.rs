//! Board (arena): grid of settled cells, collision, merge and line clearing.

use crate::piece::Shape;
use std::collections::VecDeque;

/// Points per clearing pass, indexed by rows cleared in that pass.
pub const LINE_CLEAR_POINTS: [u32; 5] = [0, 40, 100, 300, 1200];

/// Score delta for one clearing pass. More than four rows (only reachable with
/// non-catalog shapes) pays the four-row amount.
pub fn line_clear_points(lines: u32) -> u32 {
    let last = LINE_CLEAR_POINTS.len() - 1;
    LINE_CLEAR_POINTS[(lines as usize).min(last)]
}

/// Board-relative position of a shape's top-left corner. May be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Board: grid of cell values. y=0 is top; every row has `width` cells and
/// there are always `height` rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub width: usize,
    pub height: usize,
    /// rows[y][x] = cell. rows[0] is top.
    rows: VecDeque<Vec<u8>>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        let rows = (0..height).map(|_| vec![0; width]).collect();
        Self {
            width,
            height,
            rows,
        }
    }

    /// Cell at signed coordinates; `None` outside the board.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.rows.iter().map(Vec::as_slice)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(|&c| c == 0))
    }

    /// True if any occupied cell of `shape` at `pos` is off the board or on a filled cell.
    pub fn collides(&self, shape: &Shape, pos: Position) -> bool {
        shape.occupied().any(|(x, y, _)| {
            let bx = pos.x + x as i32;
            let by = pos.y + y as i32;
            !matches!(self.get(bx, by), Some(0))
        })
    }

    /// Write the shape's occupied cells into the board. The caller has already
    /// checked `collides`; cells that would land off the board are skipped.
    pub fn merge(&mut self, shape: &Shape, pos: Position) {
        for (x, y, value) in shape.occupied() {
            let target = usize::try_from(pos.x + x as i32)
                .ok()
                .zip(usize::try_from(pos.y + y as i32).ok())
                .filter(|&(bx, by)| bx < self.width && by < self.height);
            debug_assert!(target.is_some(), "merge outside board at {:?}", pos);
            if let Some((bx, by)) = target {
                self.rows[by][bx] = value;
            }
        }
    }

    /// Empty every cell.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.fill(0);
        }
    }

    /// Remove complete rows bottom-to-top, inserting an empty row at the top for
    /// each. Returns the number of rows removed.
    pub fn clear_lines(&mut self) -> u32 {
        if self.width == 0 {
            return 0;
        }
        let mut cleared = 0;
        let mut y = self.rows.len();
        while y > 0 {
            let row = y - 1;
            if self.rows[row].iter().all(|&c| c != 0) {
                self.rows.remove(row);
                self.rows.push_front(vec![0; self.width]);
                cleared += 1;
                // Rows above shifted down into `row`; look at it again.
                continue;
            }
            y -= 1;
        }
        cleared
    }

    #[cfg(test)]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.rows[y][x] = value;
    }

    #[cfg(test)]
    pub fn fill_row(&mut self, y: usize, value: u8) {
        self.rows[y].fill(value);
    }
}
