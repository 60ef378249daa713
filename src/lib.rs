pub mod activation;
pub mod board;
pub mod cell;
pub mod difficulty;
pub mod error;
pub mod game;
pub mod position;
pub mod question;
pub mod scoring;

pub use activation::{ActivationReport, ActivationResult, Activator};
pub use board::{Board, FlagOutcome, RevealOutcome};
pub use cell::{Cell, CellContent, CellView, Visibility};
pub use difficulty::{Difficulty, DifficultyConfig, ParseDifficultyError};
pub use error::GameError;
pub use game::{AnswerStats, Game, GameBuilder, GameState, GameSummary, Player, MAX_LIVES};
pub use position::Position;
pub use question::{
    AnswerOutcome, Question, QuestionBank, QuestionPresenter, QuestionSource, ScriptedPresenter,
};
pub use scoring::{score_rule, Effect, QuestionLevel, Reward, ScoreRule};
