use crate::{Difficulty, Position};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Position {0:?} is out of bounds")]
    OutOfBounds(Position),
    #[error("The game is over, no new moves are accepted")]
    GameOver,
    #[error("Cell at {0:?} is already revealed")]
    AlreadyRevealed(Position),
    #[error("Cell at {0:?} is flagged")]
    CellFlagged(Position),
    #[error("Cell at {0:?} has to be revealed first")]
    NotRevealed(Position),
    #[error("Cell at {0:?} is not a question or surprise cell")]
    NotSpecial(Position),
    #[error("Cell at {0:?} was already used")]
    AlreadyUsed(Position),
    #[error("Not enough points to activate: score is {score}, activation costs {cost}")]
    InsufficientScore { score: i32, cost: u32 },
    #[error("Cannot place more flags: {placed} flags already cover the {hidden_mines} hidden mines")]
    FlagLimitReached { placed: usize, hidden_mines: usize },
    #[error("No question source is available")]
    NoQuestionSource,
    #[error("No unused question is left for {0} difficulty")]
    NoQuestionAvailable(Difficulty),
    #[error("Too many mines ({mines}) for board size {rows}x{cols}")]
    TooManyMines { rows: usize, cols: usize, mines: usize },
    #[error("Invalid board layout: {0}")]
    InvalidLayout(String),
}
