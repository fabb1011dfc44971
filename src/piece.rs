//! Piece catalog: the seven tetrominoes as small cell matrices, and pure rotation.

/// Tetromino kinds (I, J, L, O, S, T, Z).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    pub const ALL: [Self; 7] = [Self::I, Self::J, Self::L, Self::O, Self::S, Self::T, Self::Z];

    /// Value this kind writes into board cells (1..=7). Also its colour index + 1.
    pub fn cell_value(self) -> u8 {
        match self {
            Self::I => 1,
            Self::J => 2,
            Self::L => 3,
            Self::O => 4,
            Self::S => 5,
            Self::T => 6,
            Self::Z => 7,
        }
    }

    /// Inverse of [`cell_value`](Self::cell_value); `None` for 0 or unknown values.
    pub fn from_cell_value(value: u8) -> Option<Self> {
        let index = usize::from(value).checked_sub(1)?;
        Self::ALL.get(index).copied()
    }

    /// Colour index 0..7 for `Theme::piece_color`.
    pub fn color_index(self) -> usize {
        usize::from(self.cell_value() - 1)
    }

    pub fn name(self) -> char {
        match self {
            Self::I => 'I',
            Self::J => 'J',
            Self::L => 'L',
            Self::O => 'O',
            Self::S => 'S',
            Self::T => 'T',
            Self::Z => 'Z',
        }
    }

    /// Canonical spawn orientation. Occupied cells hold [`cell_value`](Self::cell_value).
    pub fn shape(self) -> Shape {
        let v = self.cell_value();
        let rows = match self {
            Self::I => vec![
                vec![0, 0, 0, 0],
                vec![v, v, v, v],
                vec![0, 0, 0, 0],
                vec![0, 0, 0, 0],
            ],
            Self::J => vec![vec![v, 0, 0], vec![v, v, v], vec![0, 0, 0]],
            Self::L => vec![vec![0, 0, v], vec![v, v, v], vec![0, 0, 0]],
            Self::O => vec![vec![v, v], vec![v, v]],
            Self::S => vec![vec![0, v, v], vec![v, v, 0], vec![0, 0, 0]],
            Self::T => vec![vec![0, v, 0], vec![v, v, v], vec![0, 0, 0]],
            Self::Z => vec![vec![v, v, 0], vec![0, v, v], vec![0, 0, 0]],
        };
        Shape::from_rows(rows)
    }
}

/// Rotation direction (quarter turn).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Clockwise,
    CounterClockwise,
}

impl Rotation {
    pub fn inverse(self) -> Self {
        match self {
            Self::Clockwise => Self::CounterClockwise,
            Self::CounterClockwise => Self::Clockwise,
        }
    }
}

/// Rectangular matrix of cell values; 0 is empty. `rows[0]` is the top row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    rows: Vec<Vec<u8>>,
}

impl Shape {
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Self {
        debug_assert!(
            rows.windows(2).all(|w| w[0].len() == w[1].len()),
            "shape rows must have equal length"
        );
        Self { rows }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    #[cfg(test)]
    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    /// Non-zero cells as (x, y, value) in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize, u8)> + '_ {
        self.rows.iter().enumerate().flat_map(|(y, row)| {
            row.iter()
                .enumerate()
                .filter(|&(_, &v)| v != 0)
                .map(move |(x, &v)| (x, y, v))
        })
    }

    /// Quarter turn: transpose, then mirror rows (clockwise) or flip row order
    /// (counter-clockwise). Works for non-square matrices too.
    pub fn rotated(&self, rotation: Rotation) -> Self {
        let (w, h) = (self.width(), self.height());
        let mut rows: Vec<Vec<u8>> = (0..w)
            .map(|x| (0..h).map(|y| self.rows[y][x]).collect())
            .collect();
        match rotation {
            Rotation::Clockwise => rows.iter_mut().for_each(|row| row.reverse()),
            Rotation::CounterClockwise => rows.reverse(),
        }
        Self { rows }
    }
}
