use crate::{Cell, CellContent, CellView, DifficultyConfig, GameError, Position, Visibility};
use itertools::iproduct;
use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{HashSet, VecDeque};

/// Side of the square block uncovered by the block reward.
const BLOCK_SIZE: usize = 3;
/// Random top-left corners tried before scanning every block.
const BLOCK_ATTEMPTS: usize = 20;

/// Cells uncovered by a single board operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RevealOutcome {
    pub revealed: Vec<Position>,
    pub safe_revealed: usize,
    pub mines_revealed: usize,
    /// Wrong flags taken back because an uncovered mine lowered the flag cap.
    pub flags_cleared: Vec<Position>,
}

impl RevealOutcome {
    pub fn hit_mine(&self) -> bool {
        self.mines_revealed > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOutcome {
    Placed { on_mine: bool },
    Removed,
}

/// One player's grid. Owns cell state and local counters; score and lives
/// are applied by the `Game` from the returned outcomes.
#[derive(Debug, Clone)]
pub struct Board {
    grid: Array2<Cell>,
    mines_count: usize,
    mines_revealed: usize,
    flags_placed: usize,
    safe_cells_remaining: usize,
}

impl Board {
    /// Random board for the given configuration.
    pub fn generate<R: Rng + ?Sized>(
        config: &DifficultyConfig,
        rng: &mut R,
    ) -> Result<Self, GameError> {
        let mut board = Board::empty(config.rows, config.cols, config.mines)?;
        board.place_mines(config.mines, rng);
        board.compute_numbers();
        board.place_specials(config.questions, config.surprises, rng);

        log::debug!(
            "Generated {}x{} board: {} mines, {} safe cells",
            config.rows,
            config.cols,
            board.mines_count,
            board.safe_cells_remaining
        );
        Ok(board)
    }

    /// Board with explicit mine and special-cell positions.
    ///
    /// Special cells must land on safe cells without adjacent mines.
    pub fn from_layout(
        rows: usize,
        cols: usize,
        mines: &[Position],
        questions: &[Position],
        surprises: &[Position],
    ) -> Result<Self, GameError> {
        let unique_mines: HashSet<Position> = mines.iter().copied().collect();
        let mut board = Board::empty(rows, cols, unique_mines.len())?;

        for &pos in &unique_mines {
            board.get_cell(pos)?;
            board.grid[pos.to_nd_index()].set_content(CellContent::Mine);
        }
        board.compute_numbers();

        let specials = questions
            .iter()
            .map(|&pos| (pos, CellContent::Question))
            .chain(surprises.iter().map(|&pos| (pos, CellContent::Surprise)));
        for (pos, content) in specials {
            if board.get_cell(pos)?.content() != CellContent::Empty {
                return Err(GameError::InvalidLayout(format!(
                    "{content:?} cell at {pos:?} must be a safe cell with no adjacent mines"
                )));
            }
            board.grid[pos.to_nd_index()].set_content(content);
        }

        Ok(board)
    }

    fn empty(rows: usize, cols: usize, mines: usize) -> Result<Self, GameError> {
        if rows == 0 || cols == 0 {
            return Err(GameError::InvalidLayout(format!(
                "board must have at least one cell, got {rows}x{cols}"
            )));
        }
        if mines >= rows * cols {
            return Err(GameError::TooManyMines { rows, cols, mines });
        }

        Ok(Board {
            grid: Array2::from_shape_fn((rows, cols), |(row, col)| {
                Cell::new(Position::new(row, col))
            }),
            mines_count: mines,
            mines_revealed: 0,
            flags_placed: 0,
            safe_cells_remaining: rows * cols - mines,
        })
    }

    fn place_mines<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        let (rows, cols) = self.dimensions();
        let mut mines_placed = 0;

        while mines_placed < count {
            let pos = Position::new(rng.gen_range(0..rows), rng.gen_range(0..cols));
            let cell = &mut self.grid[pos.to_nd_index()];

            if cell.content() == CellContent::Empty {
                cell.set_content(CellContent::Mine);
                mines_placed += 1;
            }
        }
    }

    fn compute_numbers(&mut self) {
        let (rows, cols) = self.dimensions();
        for (row, col) in iproduct!(0..rows, 0..cols) {
            let pos = Position::new(row, col);
            if self.grid[pos.to_nd_index()].is_mine() {
                continue;
            }
            let adjacent = self.count_adjacent_mines(pos);
            if adjacent > 0 {
                self.grid[pos.to_nd_index()].set_content(CellContent::Number(adjacent));
            }
        }
    }

    fn place_specials<R: Rng + ?Sized>(&mut self, questions: usize, surprises: usize, rng: &mut R) {
        let mut eligible: Vec<Position> = self
            .grid
            .iter()
            .filter(|cell| cell.content() == CellContent::Empty)
            .map(Cell::position)
            .collect();

        if eligible.len() < questions + surprises {
            log::warn!(
                "Only {} cells can hold special content, requested {} questions and {} surprises",
                eligible.len(),
                questions,
                surprises
            );
        }

        eligible.shuffle(rng);
        let contents = std::iter::repeat(CellContent::Question)
            .take(questions)
            .chain(std::iter::repeat(CellContent::Surprise).take(surprises));
        for (pos, content) in eligible.into_iter().zip(contents) {
            self.grid[pos.to_nd_index()].set_content(content);
        }
    }

    pub fn is_within_bounds(&self, pos: Position) -> bool {
        let (rows, cols) = self.dimensions();
        pos.row < rows && pos.col < cols
    }

    pub fn get_cell(&self, pos: Position) -> Result<&Cell, GameError> {
        self.grid
            .get(pos.to_nd_index())
            .ok_or(GameError::OutOfBounds(pos))
    }

    pub fn count_adjacent_mines(&self, pos: Position) -> u8 {
        let (rows, cols) = self.dimensions();
        pos.neighbors(rows, cols)
            .filter(|p| self.grid[p.to_nd_index()].is_mine())
            .count() as u8
    }

    /// Reveals a hidden cell and cascades through empty and special cells.
    ///
    /// Number cells are revealed but stop the cascade; mines never join it.
    pub fn reveal(&mut self, pos: Position) -> Result<RevealOutcome, GameError> {
        match self.get_cell(pos)?.visibility() {
            Visibility::Revealed => return Err(GameError::AlreadyRevealed(pos)),
            Visibility::Flagged => return Err(GameError::CellFlagged(pos)),
            Visibility::Hidden => {}
        }

        let (rows, cols) = self.dimensions();
        let mut outcome = RevealOutcome::default();
        let mut to_visit = VecDeque::from([pos]);
        self.uncover(pos, &mut outcome);

        while let Some(current) = to_visit.pop_front() {
            if !self.grid[current.to_nd_index()].content().spreads() {
                continue;
            }
            for neighbor in current.neighbors(rows, cols) {
                let cell = &self.grid[neighbor.to_nd_index()];
                if !cell.is_hidden() || cell.is_mine() {
                    continue;
                }
                self.uncover(neighbor, &mut outcome);
                to_visit.push_back(neighbor);
            }
        }

        self.enforce_flag_cap(&mut outcome);
        log::debug!("Reveal at {:?} uncovered {} cells", pos, outcome.revealed.len());
        Ok(outcome)
    }

    fn uncover(&mut self, pos: Position, outcome: &mut RevealOutcome) {
        let cell = &mut self.grid[pos.to_nd_index()];
        cell.set_visibility(Visibility::Revealed);
        if cell.is_mine() {
            self.mines_revealed += 1;
            outcome.mines_revealed += 1;
        } else {
            self.safe_cells_remaining -= 1;
            outcome.safe_revealed += 1;
        }
        outcome.revealed.push(pos);
    }

    /// Keeps `flags_placed <= hidden_mines` after mines are uncovered.
    ///
    /// Flagged cells are never uncovered, so every flag on a mine still sits
    /// on a hidden mine and any excess lies on safe cells. Those flags are
    /// lifted in row-major order; their placement penalty stays applied.
    fn enforce_flag_cap(&mut self, outcome: &mut RevealOutcome) {
        let excess = self.flags_placed.saturating_sub(self.hidden_mines());
        if excess == 0 {
            return;
        }
        let wrong: Vec<Position> = self
            .grid
            .iter()
            .filter(|cell| cell.is_flagged() && !cell.is_mine())
            .map(Cell::position)
            .take(excess)
            .collect();
        for pos in wrong {
            self.grid[pos.to_nd_index()].set_visibility(Visibility::Hidden);
            self.flags_placed -= 1;
            outcome.flags_cleared.push(pos);
        }
        log::debug!("Flag cap dropped, lifted flags at {:?}", outcome.flags_cleared);
    }

    /// Places or removes a flag. New flags are capped at the hidden mine count.
    pub fn toggle_flag(&mut self, pos: Position) -> Result<FlagOutcome, GameError> {
        match self.get_cell(pos)?.visibility() {
            Visibility::Revealed => Err(GameError::AlreadyRevealed(pos)),
            Visibility::Flagged => {
                self.grid[pos.to_nd_index()].set_visibility(Visibility::Hidden);
                self.flags_placed -= 1;
                Ok(FlagOutcome::Removed)
            }
            Visibility::Hidden => {
                let hidden_mines = self.hidden_mines();
                if self.flags_placed >= hidden_mines {
                    return Err(GameError::FlagLimitReached {
                        placed: self.flags_placed,
                        hidden_mines,
                    });
                }
                let cell = &mut self.grid[pos.to_nd_index()];
                cell.set_visibility(Visibility::Flagged);
                self.flags_placed += 1;
                Ok(FlagOutcome::Placed {
                    on_mine: cell.is_mine(),
                })
            }
        }
    }

    /// Checks that the cell at `pos` can be activated and returns its content.
    pub fn activatable(&self, pos: Position) -> Result<CellContent, GameError> {
        let cell = self.get_cell(pos)?;
        if !cell.is_revealed() {
            return Err(GameError::NotRevealed(pos));
        }
        if !cell.content().is_special() {
            return Err(GameError::NotSpecial(pos));
        }
        if cell.is_used() {
            return Err(GameError::AlreadyUsed(pos));
        }
        Ok(cell.content())
    }

    pub(crate) fn mark_used(&mut self, pos: Position, question_id: Option<u32>) {
        if let Some(cell) = self.grid.get_mut(pos.to_nd_index()) {
            cell.mark_used(question_id);
        }
    }

    /// Every mine is either revealed or flagged.
    pub fn all_mines_found(&self) -> bool {
        self.grid
            .iter()
            .filter(|cell| cell.is_mine())
            .all(|cell| !cell.is_hidden())
    }

    /// All mines found, or no safe cell left to reveal.
    pub fn is_cleared(&self) -> bool {
        self.safe_cells_remaining == 0 || self.all_mines_found()
    }

    /// Uncovers one random mine that is neither revealed nor flagged.
    pub fn reveal_random_mine<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Position> {
        let candidates: Vec<Position> = self
            .grid
            .iter()
            .filter(|cell| cell.is_mine() && cell.is_hidden())
            .map(Cell::position)
            .collect();
        let pos = *candidates.choose(rng)?;

        let mut outcome = RevealOutcome::default();
        self.uncover(pos, &mut outcome);
        self.enforce_flag_cap(&mut outcome);
        Some(pos)
    }

    /// Uncovers the 3x3 block with the most hidden cells among a random sample,
    /// scanning every block if the sample found nothing to uncover.
    pub fn reveal_best_block<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<RevealOutcome> {
        let (rows, cols) = self.dimensions();
        let max_row = rows.saturating_sub(BLOCK_SIZE);
        let max_col = cols.saturating_sub(BLOCK_SIZE);

        let sampled = (0..BLOCK_ATTEMPTS)
            .map(|_| Position::new(rng.gen_range(0..=max_row), rng.gen_range(0..=max_col)))
            .max_by_key(|&top_left| self.hidden_in_block(top_left))
            .filter(|&top_left| self.hidden_in_block(top_left) > 0);

        let top_left = match sampled {
            Some(top_left) => top_left,
            None => iproduct!(0..=max_row, 0..=max_col)
                .map(Position::from)
                .max_by_key(|&top_left| self.hidden_in_block(top_left))
                .filter(|&top_left| self.hidden_in_block(top_left) > 0)?,
        };

        let mut outcome = RevealOutcome::default();
        for pos in self.block(top_left).collect::<Vec<_>>() {
            if self.grid[pos.to_nd_index()].is_hidden() {
                self.uncover(pos, &mut outcome);
            }
        }
        self.enforce_flag_cap(&mut outcome);
        Some(outcome)
    }

    fn block(&self, top_left: Position) -> impl Iterator<Item = Position> {
        let (rows, cols) = self.dimensions();
        let row_end = (top_left.row + BLOCK_SIZE).min(rows);
        let col_end = (top_left.col + BLOCK_SIZE).min(cols);
        iproduct!(top_left.row..row_end, top_left.col..col_end).map(Position::from)
    }

    fn hidden_in_block(&self, top_left: Position) -> usize {
        self.block(top_left)
            .filter(|pos| self.grid[pos.to_nd_index()].is_hidden())
            .count()
    }

    /// Forces every cell to revealed for the final display.
    pub(crate) fn reveal_all(&mut self) {
        for cell in self.grid.iter_mut() {
            cell.set_visibility(Visibility::Revealed);
        }
        self.mines_revealed = self.mines_count;
        self.flags_placed = 0;
        self.safe_cells_remaining = 0;
    }

    pub fn dimensions(&self) -> (usize, usize) {
        self.grid.dim()
    }

    pub fn mines_count(&self) -> usize {
        self.mines_count
    }

    /// Mines not yet revealed, flagged or not.
    pub fn hidden_mines(&self) -> usize {
        self.mines_count - self.mines_revealed
    }

    pub fn flags_placed(&self) -> usize {
        self.flags_placed
    }

    /// Mine counter for display: configured mines minus flags.
    pub fn mines_left(&self) -> isize {
        self.mines_count as isize - self.flags_placed as isize
    }

    pub fn safe_cells_remaining(&self) -> usize {
        self.safe_cells_remaining
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.grid.iter()
    }

    pub fn view(&self, pos: Position) -> Result<CellView, GameError> {
        self.get_cell(pos).map(Cell::view)
    }

    pub fn rows_view(&self) -> impl Iterator<Item = Vec<CellView>> + '_ {
        self.grid
            .rows()
            .into_iter()
            .map(|row| row.iter().map(Cell::view).collect())
    }
}
