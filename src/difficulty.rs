use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// Fixed parameters of a difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DifficultyConfig {
    pub rows: usize,
    pub cols: usize,
    pub mines: usize,
    pub questions: usize,
    pub surprises: usize,
    pub starting_lives: u32,
    /// Points charged per special-cell activation, also the life-to-score rate.
    pub activation_cost: u32,
    pub surprise_value: u32,
    pub mine_flag_reward: u32,
    pub safe_flag_penalty: u32,
}

const EASY: DifficultyConfig = DifficultyConfig {
    rows: 9,
    cols: 9,
    mines: 10,
    questions: 6,
    surprises: 2,
    starting_lives: 10,
    activation_cost: 5,
    surprise_value: 8,
    mine_flag_reward: 1,
    safe_flag_penalty: 3,
};

const MEDIUM: DifficultyConfig = DifficultyConfig {
    rows: 13,
    cols: 13,
    mines: 26,
    questions: 7,
    surprises: 3,
    starting_lives: 8,
    activation_cost: 8,
    surprise_value: 12,
    mine_flag_reward: 1,
    safe_flag_penalty: 3,
};

const HARD: DifficultyConfig = DifficultyConfig {
    rows: 16,
    cols: 16,
    mines: 44,
    questions: 11,
    surprises: 4,
    starting_lives: 6,
    activation_cost: 12,
    surprise_value: 16,
    mine_flag_reward: 1,
    safe_flag_penalty: 3,
};

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub const fn config(self) -> &'static DifficultyConfig {
        match self {
            Difficulty::Easy => &EASY,
            Difficulty::Medium => &MEDIUM,
            Difficulty::Hard => &HARD,
        }
    }
}

impl DifficultyConfig {
    pub fn total_cells(&self) -> usize {
        self.rows * self.cols
    }

    pub fn safe_cells(&self) -> usize {
        self.total_cells().saturating_sub(self.mines)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown difficulty '{0}', expected easy, medium or hard")]
pub struct ParseDifficultyError(String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}
