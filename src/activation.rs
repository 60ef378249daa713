//! Special-cell activation.
//!
//! Every activation follows the same sequence in [`run_activation`]: validate
//! the cell, check the player can pay, run variant prechecks, charge the
//! activation cost, apply the variant effect and its follow-up, then report.
//! Question and surprise cells only differ in the steps of [`Activator`].

use crate::{
    score_rule, AnswerOutcome, CellContent, Game, GameError, Player, Position, Reward,
};
use rand::Rng;

/// Result of the variable step of an activation.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationResult {
    pub answer: Option<AnswerOutcome>,
    pub detail: String,
    pub question_id: Option<u32>,
    pub reward: Option<Reward>,
}

impl ActivationResult {
    fn plain(detail: String) -> Self {
        Self {
            answer: None,
            detail,
            question_id: None,
            reward: None,
        }
    }
}

/// What an activation did to the shared economy.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationReport {
    pub position: Position,
    pub content: CellContent,
    pub answer: Option<AnswerOutcome>,
    pub score_before: i32,
    pub score_after: i32,
    pub lives_before: u32,
    pub lives_after: u32,
    pub message: String,
}

/// Variable steps of a special-cell activation.
pub trait Activator {
    fn name(&self) -> &'static str;

    /// Cell content this activator handles.
    fn content(&self) -> CellContent;

    fn precheck(&self, _game: &Game) -> Result<(), GameError> {
        Ok(())
    }

    /// Runs after the activation cost has been charged.
    fn effect(&mut self, game: &mut Game) -> Result<ActivationResult, GameError>;

    fn post_effect(&mut self, _game: &mut Game, _result: &ActivationResult) -> Option<String> {
        None
    }
}

/// Quiz activation: asks one unused question and scores the answer.
#[derive(Debug, Clone, Copy)]
pub struct QuestionActivator {
    player: Player,
}

impl QuestionActivator {
    pub fn new(player: Player) -> Self {
        Self { player }
    }
}

impl Activator for QuestionActivator {
    fn name(&self) -> &'static str {
        "Question"
    }

    fn content(&self) -> CellContent {
        CellContent::Question
    }

    fn precheck(&self, game: &Game) -> Result<(), GameError> {
        if game.questions.is_none() || game.presenter.is_none() {
            return Err(GameError::NoQuestionSource);
        }
        Ok(())
    }

    fn effect(&mut self, game: &mut Game) -> Result<ActivationResult, GameError> {
        let difficulty = game.difficulty();
        let question = game
            .questions
            .as_mut()
            .and_then(|source| source.fetch_unused(difficulty))
            .ok_or(GameError::NoQuestionAvailable(difficulty))?;
        let answer = game
            .presenter
            .as_mut()
            .map_or(AnswerOutcome::Skipped, |presenter| presenter.present(&question));

        let (detail, reward) = match answer {
            AnswerOutcome::Skipped => (format!("{} question skipped", question.level), None),
            AnswerOutcome::Correct | AnswerOutcome::Wrong => {
                let correct = answer == AnswerOutcome::Correct;
                game.stats.record(correct);

                let effect = score_rule(difficulty, question.level, correct).resolve(&mut game.rng);
                game.apply_effect(effect);
                let verdict = if correct { "Correct" } else { "Wrong" };
                (
                    format!("{verdict} answer to a {} question: {effect}", question.level),
                    effect.reward,
                )
            }
        };

        Ok(ActivationResult {
            answer: Some(answer),
            detail,
            question_id: Some(question.id),
            reward,
        })
    }

    fn post_effect(&mut self, game: &mut Game, result: &ActivationResult) -> Option<String> {
        match result.reward? {
            Reward::RevealMine => {
                let pos = game.reward_reveal_mine(self.player)?;
                Some(format!("Mine uncovered at row {}, col {}", pos.row, pos.col))
            }
            Reward::RevealBlock => {
                let cells = game.reward_reveal_block(self.player)?;
                Some(format!("{cells} cells uncovered"))
            }
        }
    }
}

/// Coin-flip activation: gain or lose points and a life.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurpriseActivator;

impl Activator for SurpriseActivator {
    fn name(&self) -> &'static str {
        "Surprise"
    }

    fn content(&self) -> CellContent {
        CellContent::Surprise
    }

    fn effect(&mut self, game: &mut Game) -> Result<ActivationResult, GameError> {
        let value = game.config().surprise_value as i32;
        let detail = if game.rng.gen_bool(0.5) {
            game.add_score(value);
            game.gain_lives(1);
            format!("Good surprise: +{value} points, +1 life")
        } else {
            game.add_score(-value);
            game.lose_lives(1);
            format!("Bad surprise: -{value} points, -1 life")
        };
        Ok(ActivationResult::plain(detail))
    }
}

/// Runs the full activation sequence for the cell at `pos` on `player`'s board.
///
/// The cost is charged as soon as prechecks pass, so a failing effect
/// (no question left) still costs points and leaves the cell unused.
pub(crate) fn run_activation<A: Activator + ?Sized>(
    game: &mut Game,
    player: Player,
    pos: Position,
    activator: &mut A,
) -> Result<ActivationReport, GameError> {
    let content = game.board(player).activatable(pos)?;
    if content != activator.content() {
        return Err(GameError::NotSpecial(pos));
    }

    let cost = game.config().activation_cost;
    if game.score() < cost as i32 {
        return Err(GameError::InsufficientScore {
            score: game.score(),
            cost,
        });
    }
    activator.precheck(game)?;

    let (score_before, lives_before) = (game.score(), game.lives());
    game.add_score(-(cost as i32));

    let result = activator.effect(game);
    let result = match result {
        Ok(result) => result,
        Err(err) => {
            game.update_state();
            return Err(err);
        }
    };
    let extra = activator.post_effect(game, &result);
    game.board_mut(player).mark_used(pos, result.question_id);
    game.update_state();

    let (score_after, lives_after) = (game.score(), game.lives());
    let mut message = format!(
        "{} at row {}, col {} (cost {cost}): {}.",
        activator.name(),
        pos.row,
        pos.col,
        result.detail
    );
    if let Some(extra) = extra {
        message.push_str(&format!(" {extra}."));
    }
    message.push_str(&format!(
        " Score {score_before} -> {score_after}, lives {lives_before} -> {lives_after}."
    ));

    log::debug!("{message}");
    game.set_message(message.clone());

    Ok(ActivationReport {
        position: pos,
        content,
        answer: result.answer,
        score_before,
        score_after,
        lives_before,
        lives_after,
        message,
    })
}
