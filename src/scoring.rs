//! Quiz rewards and penalties, keyed by game difficulty, question level and
//! answer correctness.

use crate::Difficulty;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionLevel {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl QuestionLevel {
    pub const ALL: [QuestionLevel; 4] = [
        QuestionLevel::Easy,
        QuestionLevel::Medium,
        QuestionLevel::Hard,
        QuestionLevel::Expert,
    ];
}

impl fmt::Display for QuestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Board help granted on top of points and lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reward {
    RevealMine,
    RevealBlock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Effect {
    pub score: i32,
    pub lives: i32,
    pub reward: Option<Reward>,
}

impl Effect {
    const NOTHING: Effect = Effect::new(0, 0);

    const fn new(score: i32, lives: i32) -> Self {
        Self {
            score,
            lives,
            reward: None,
        }
    }

    const fn with_reward(score: i32, reward: Reward) -> Self {
        Self {
            score,
            lives: 0,
            reward: Some(reward),
        }
    }

    pub fn is_nothing(&self) -> bool {
        *self == Effect::NOTHING
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_nothing() {
            return f.write_str("no change");
        }

        let mut parts = Vec::new();
        if self.score != 0 {
            parts.push(format!("{:+} points", self.score));
        }
        match self.lives {
            0 => {}
            1 | -1 => parts.push(format!("{:+} life", self.lives)),
            n => parts.push(format!("{n:+} lives")),
        }
        match self.reward {
            Some(Reward::RevealMine) => parts.push("a mine is revealed".to_string()),
            Some(Reward::RevealBlock) => parts.push("a 3x3 area is revealed".to_string()),
            None => {}
        }
        f.write_str(&parts.join(", "))
    }
}

/// A fixed effect, or a fair coin flip between two effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreRule {
    Fixed(Effect),
    EitherOf(Effect, Effect),
}

impl ScoreRule {
    pub fn resolve<R: Rng + ?Sized>(&self, rng: &mut R) -> Effect {
        match *self {
            ScoreRule::Fixed(effect) => effect,
            ScoreRule::EitherOf(first, second) => {
                if rng.gen_bool(0.5) {
                    first
                } else {
                    second
                }
            }
        }
    }

    /// Every effect this rule can produce.
    pub fn outcomes(&self) -> Vec<Effect> {
        match *self {
            ScoreRule::Fixed(effect) => vec![effect],
            ScoreRule::EitherOf(first, second) => vec![first, second],
        }
    }
}

impl fmt::Display for ScoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreRule::Fixed(effect) => write!(f, "{effect}"),
            ScoreRule::EitherOf(first, second) => write!(f, "{first} or {second}"),
        }
    }
}

pub fn score_rule(game: Difficulty, level: QuestionLevel, correct: bool) -> ScoreRule {
    use Difficulty as D;
    use QuestionLevel as Q;
    use ScoreRule::{EitherOf, Fixed};

    let fixed = |score, lives| Fixed(Effect::new(score, lives));

    match (game, level, correct) {
        (D::Easy, Q::Easy, true) => fixed(3, 1),
        (D::Easy, Q::Easy, false) => EitherOf(Effect::new(-3, 0), Effect::NOTHING),
        (D::Easy, Q::Medium, true) => Fixed(Effect::with_reward(6, Reward::RevealMine)),
        (D::Easy, Q::Medium, false) => EitherOf(Effect::new(-6, 0), Effect::NOTHING),
        (D::Easy, Q::Hard, true) => Fixed(Effect::with_reward(10, Reward::RevealBlock)),
        (D::Easy, Q::Hard, false) => fixed(-10, 0),
        (D::Easy, Q::Expert, true) => fixed(15, 2),
        (D::Easy, Q::Expert, false) => fixed(-15, -1),

        (D::Medium, Q::Easy, true) => fixed(8, 1),
        (D::Medium, Q::Easy, false) => fixed(-8, 0),
        (D::Medium, Q::Medium, true) => fixed(10, 1),
        (D::Medium, Q::Medium, false) => EitherOf(Effect::new(-10, -1), Effect::NOTHING),
        (D::Medium, Q::Hard, true) => fixed(15, 1),
        (D::Medium, Q::Hard, false) => fixed(-15, -1),
        (D::Medium, Q::Expert, true) => fixed(20, 2),
        (D::Medium, Q::Expert, false) => EitherOf(Effect::new(-20, -1), Effect::new(-20, -2)),

        (D::Hard, Q::Easy, true) => fixed(10, 1),
        (D::Hard, Q::Easy, false) => fixed(-10, -1),
        (D::Hard, Q::Medium, true) => EitherOf(Effect::new(15, 1), Effect::new(15, 2)),
        (D::Hard, Q::Medium, false) => EitherOf(Effect::new(-15, -1), Effect::new(-15, -2)),
        (D::Hard, Q::Hard, true) => fixed(20, 2),
        (D::Hard, Q::Hard, false) => fixed(-20, -2),
        (D::Hard, Q::Expert, true) => fixed(40, 3),
        (D::Hard, Q::Expert, false) => fixed(-40, -3),
    }
}
