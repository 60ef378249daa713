use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Neighbours inside a `rows` x `cols` grid, up to 8 of them.
    pub fn neighbors(&self, rows: usize, cols: usize) -> impl Iterator<Item = Position> + '_ {
        (-1isize..=1).flat_map(move |dr| {
            (-1isize..=1).filter_map(move |dc| {
                if dr == 0 && dc == 0 {
                    return None;
                }
                let row = self.row.checked_add_signed(dr)?;
                let col = self.col.checked_add_signed(dc)?;
                (row < rows && col < cols).then(|| Position::new(row, col))
            })
        })
    }

    pub(crate) fn to_nd_index(self) -> [usize; 2] {
        [self.row, self.col]
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}
