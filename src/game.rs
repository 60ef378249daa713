use crate::activation::{run_activation, ActivationReport, QuestionActivator, SurpriseActivator};
use crate::{
    Board, CellContent, Difficulty, DifficultyConfig, Effect, FlagOutcome, GameError, Position,
    QuestionPresenter, QuestionSource, RevealOutcome,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Upper bound on shared lives; gains beyond it turn into points.
pub const MAX_LIVES: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Running,
    Won,
    Lost,
}

impl GameState {
    pub fn is_finished(self) -> bool {
        matches!(self, GameState::Won | GameState::Lost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn other(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Player::One => 0,
            Player::Two => 1,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.index() + 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AnswerStats {
    pub answered: u32,
    pub correct: u32,
}

impl AnswerStats {
    pub(crate) fn record(&mut self, correct: bool) {
        self.answered += 1;
        if correct {
            self.correct += 1;
        }
    }
}

/// Final numbers of a finished game.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSummary {
    pub difficulty: Difficulty,
    pub outcome: GameState,
    pub score: i32,
    pub lives: u32,
    pub questions_answered: u32,
    pub correct_answers: u32,
    pub elapsed: Duration,
}

pub struct GameBuilder {
    difficulty: Difficulty,
    seed: Option<u64>,
    score: i32,
    lives: Option<u32>,
    boards: Option<[Board; 2]>,
    questions: Option<Box<dyn QuestionSource>>,
    presenter: Option<Box<dyn QuestionPresenter>>,
}

impl GameBuilder {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            seed: None,
            score: 0,
            lives: None,
            boards: None,
            questions: None,
            presenter: None,
        }
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn starting_score(mut self, score: i32) -> Self {
        self.score = score;
        self
    }

    /// Clamped to `MAX_LIVES`.
    pub fn starting_lives(mut self, lives: u32) -> Self {
        self.lives = Some(lives);
        self
    }

    /// Use prepared boards instead of generating them. Restarting still
    /// generates fresh boards.
    pub fn boards(mut self, first: Board, second: Board) -> Self {
        self.boards = Some([first, second]);
        self
    }

    pub fn question_source(mut self, source: impl QuestionSource + 'static) -> Self {
        self.questions = Some(Box::new(source));
        self
    }

    pub fn presenter(mut self, presenter: impl QuestionPresenter + 'static) -> Self {
        self.presenter = Some(Box::new(presenter));
        self
    }

    pub fn build(self) -> Result<Game, GameError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let config = self.difficulty.config();
        let boards = match self.boards {
            Some(boards) => boards,
            None => [
                Board::generate(config, &mut rng)?,
                Board::generate(config, &mut rng)?,
            ],
        };

        let mut game = Game {
            difficulty: self.difficulty,
            boards,
            score: self.score,
            lives: self.lives.unwrap_or(config.starting_lives).min(MAX_LIVES),
            state: GameState::Running,
            turn: Player::One,
            message: None,
            stats: AnswerStats::default(),
            questions: self.questions,
            presenter: self.presenter,
            rng,
        };
        game.update_state();
        Ok(game)
    }
}

/// A cooperative session: two boards sharing one score and one pool of lives.
pub struct Game {
    difficulty: Difficulty,
    boards: [Board; 2],
    score: i32,
    lives: u32,
    state: GameState,
    turn: Player,
    message: Option<String>,
    pub(crate) stats: AnswerStats,
    pub(crate) questions: Option<Box<dyn QuestionSource>>,
    pub(crate) presenter: Option<Box<dyn QuestionPresenter>>,
    pub(crate) rng: StdRng,
}

impl Game {
    pub fn new(difficulty: Difficulty) -> Result<Self, GameError> {
        GameBuilder::new(difficulty).build()
    }

    pub fn builder(difficulty: Difficulty) -> GameBuilder {
        GameBuilder::new(difficulty)
    }

    /// Reveals a cell on `player`'s board. Every safe cell uncovered is worth
    /// a point, a mine costs a life.
    pub fn reveal(&mut self, player: Player, pos: Position) -> Result<RevealOutcome, GameError> {
        self.ensure_running()?;
        let outcome = self.boards[player.index()].reveal(pos)?;

        self.lose_lives(outcome.mines_revealed as u32);
        self.add_score(outcome.safe_revealed as i32);
        self.update_state();
        Ok(outcome)
    }

    /// Toggles a flag on `player`'s board. Score changes only when a flag is placed.
    pub fn toggle_flag(&mut self, player: Player, pos: Position) -> Result<FlagOutcome, GameError> {
        self.ensure_running()?;
        let outcome = match self.boards[player.index()].toggle_flag(pos) {
            Ok(outcome) => outcome,
            Err(err @ GameError::FlagLimitReached { .. }) => return Err(self.reject(err)),
            Err(err) => return Err(err),
        };

        let config = self.config();
        match outcome {
            FlagOutcome::Placed { on_mine: true } => self.add_score(config.mine_flag_reward as i32),
            FlagOutcome::Placed { on_mine: false } => {
                self.add_score(-(config.safe_flag_penalty as i32))
            }
            FlagOutcome::Removed => {}
        }
        self.update_state();
        Ok(outcome)
    }

    /// Pays to activate a revealed question or surprise cell. The cell is
    /// marked used once the activation goes through.
    pub fn activate(
        &mut self,
        player: Player,
        pos: Position,
    ) -> Result<ActivationReport, GameError> {
        self.ensure_running()?;
        let content = match self.board(player).activatable(pos) {
            Ok(content) => content,
            Err(err) => return Err(self.reject(err)),
        };
        let result = match content {
            CellContent::Question => {
                run_activation(self, player, pos, &mut QuestionActivator::new(player))
            }
            CellContent::Surprise => run_activation(self, player, pos, &mut SurpriseActivator),
            _ => Err(GameError::NotSpecial(pos)),
        };
        result.map_err(|err| self.reject(err))
    }

    /// Hands the turn to the other player while the game is running.
    pub fn switch_turn(&mut self) -> Player {
        if self.is_running() {
            self.turn = self.turn.other();
        }
        self.turn
    }

    /// New boards and a fresh economy on the same difficulty.
    pub fn restart(&mut self) -> Result<(), GameError> {
        let config = self.config();
        self.boards = [
            Board::generate(config, &mut self.rng)?,
            Board::generate(config, &mut self.rng)?,
        ];
        self.score = 0;
        self.lives = config.starting_lives.min(MAX_LIVES);
        self.state = GameState::Running;
        self.turn = Player::One;
        self.message = None;
        self.stats = AnswerStats::default();

        log::info!("Restarted {} game", self.difficulty);
        Ok(())
    }

    /// Summary for the history log, once the game has ended.
    pub fn summary(&self, elapsed: Duration) -> Option<GameSummary> {
        self.state.is_finished().then(|| GameSummary {
            difficulty: self.difficulty,
            outcome: self.state,
            score: self.score,
            lives: self.lives,
            questions_answered: self.stats.answered,
            correct_answers: self.stats.correct,
            elapsed,
        })
    }

    pub fn set_question_source(&mut self, source: impl QuestionSource + 'static) {
        self.questions = Some(Box::new(source));
    }

    pub fn set_presenter(&mut self, presenter: impl QuestionPresenter + 'static) {
        self.presenter = Some(Box::new(presenter));
    }

    /// Fetches and clears the last message.
    pub fn take_message(&mut self) -> Option<String> {
        self.message.take()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn config(&self) -> &'static DifficultyConfig {
        self.difficulty.config()
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == GameState::Running
    }

    pub fn current_player(&self) -> Player {
        self.turn
    }

    pub fn stats(&self) -> AnswerStats {
        self.stats
    }

    pub fn board(&self, player: Player) -> &Board {
        &self.boards[player.index()]
    }

    pub(crate) fn board_mut(&mut self, player: Player) -> &mut Board {
        &mut self.boards[player.index()]
    }

    fn ensure_running(&self) -> Result<(), GameError> {
        if self.is_running() {
            Ok(())
        } else {
            Err(GameError::GameOver)
        }
    }

    fn reject(&mut self, err: GameError) -> GameError {
        if err != GameError::GameOver {
            self.message = Some(err.to_string());
        }
        err
    }

    pub(crate) fn set_message(&mut self, message: String) {
        self.message = Some(message);
    }

    pub(crate) fn add_score(&mut self, delta: i32) {
        if self.is_running() {
            self.score += delta;
        }
    }

    /// Lives past `MAX_LIVES` are paid out at the activation cost each.
    pub(crate) fn gain_lives(&mut self, count: u32) {
        if !self.is_running() {
            return;
        }
        let total = self.lives + count;
        if total > MAX_LIVES {
            let excess = total - MAX_LIVES;
            self.lives = MAX_LIVES;
            self.score += (excess * self.config().activation_cost) as i32;
        } else {
            self.lives = total;
        }
    }

    pub(crate) fn lose_lives(&mut self, count: u32) {
        if self.is_running() {
            self.lives = self.lives.saturating_sub(count);
        }
    }

    pub(crate) fn apply_effect(&mut self, effect: Effect) {
        self.add_score(effect.score);
        if effect.lives >= 0 {
            self.gain_lives(effect.lives as u32);
        } else {
            self.lose_lives(effect.lives.unsigned_abs());
        }
    }

    pub(crate) fn reward_reveal_mine(&mut self, player: Player) -> Option<Position> {
        if !self.is_running() {
            return None;
        }
        self.boards[player.index()].reveal_random_mine(&mut self.rng)
    }

    /// Number of cells uncovered by the block reward.
    pub(crate) fn reward_reveal_block(&mut self, player: Player) -> Option<usize> {
        if !self.is_running() {
            return None;
        }
        self.boards[player.index()]
            .reveal_best_block(&mut self.rng)
            .map(|outcome| outcome.revealed.len())
    }

    /// Moves to Won or Lost when due. Loss wins a tie.
    pub(crate) fn update_state(&mut self) {
        if !self.is_running() {
            return;
        }
        if self.lives == 0 {
            self.finish(GameState::Lost);
        } else if self.boards.iter().any(Board::is_cleared) {
            self.finish(GameState::Won);
        }
    }

    fn finish(&mut self, state: GameState) {
        let bonus = (self.lives * self.config().activation_cost) as i32;
        self.score += bonus;
        self.state = state;
        for board in &mut self.boards {
            board.reveal_all();
        }
        log::info!(
            "{} game {:?}: score {} ({} from remaining lives), lives {}",
            self.difficulty,
            state,
            self.score,
            bonus,
            self.lives
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cell, Visibility};

    fn p(row: usize, col: usize) -> Position {
        Position::new(row, col)
    }

    /// 4x4 board with mines in two corners and a flat interior.
    fn two_mine_board() -> Board {
        Board::from_layout(4, 4, &[p(0, 0), p(3, 3)], &[], &[]).unwrap()
    }

    fn game_with(boards: [Board; 2]) -> Game {
        let [first, second] = boards;
        Game::builder(Difficulty::Easy)
            .seed(1)
            .boards(first, second)
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_game_uses_presets() {
        let game = Game::builder(Difficulty::Hard).seed(9).build().unwrap();
        assert_eq!(game.lives(), 6);
        assert_eq!(game.score(), 0);
        assert_eq!(game.state(), GameState::Running);
        assert_eq!(game.current_player(), Player::One);
        assert_eq!(game.board(Player::Two).dimensions(), (16, 16));
    }

    #[test]
    fn test_reveal_scores_each_safe_cell() {
        let mut game = game_with([two_mine_board(), two_mine_board()]);
        let outcome = game.reveal(Player::One, p(0, 1)).unwrap();
        assert_eq!(outcome.safe_revealed, 1);
        assert_eq!(game.score(), 1);
        assert!(game.reveal(Player::One, p(0, 1)).is_err());
        assert_eq!(game.score(), 1);
    }

    #[test]
    fn test_mine_costs_a_life() {
        let mut game = game_with([two_mine_board(), two_mine_board()]);
        game.reveal(Player::Two, p(0, 0)).unwrap();
        assert_eq!(game.lives(), 9);
        assert_eq!(game.score(), 0);
        assert!(game.is_running());
    }

    #[test]
    fn test_flag_scoring_only_on_placement() {
        let mut game = game_with([two_mine_board(), two_mine_board()]);
        game.toggle_flag(Player::One, p(0, 0)).unwrap();
        assert_eq!(game.score(), 1);
        game.toggle_flag(Player::One, p(1, 1)).unwrap();
        assert_eq!(game.score(), -2);
        game.toggle_flag(Player::One, p(1, 1)).unwrap();
        game.toggle_flag(Player::One, p(0, 0)).unwrap();
        assert_eq!(game.score(), -2);
        assert_eq!(game.lives(), 10);
    }

    #[test]
    fn test_flag_limit_records_message() {
        let mut game = game_with([two_mine_board(), two_mine_board()]);
        game.toggle_flag(Player::One, p(1, 1)).unwrap();
        game.toggle_flag(Player::One, p(1, 2)).unwrap();

        let err = game.toggle_flag(Player::One, p(0, 0)).unwrap_err();
        assert!(matches!(err, GameError::FlagLimitReached { .. }));
        assert_eq!(game.board(Player::One).flags_placed(), 2);
        assert_eq!(game.score(), -6);
        assert!(game.take_message().is_some());
        assert_eq!(game.take_message(), None);
    }

    #[test]
    fn test_life_cap_converts_to_score() {
        let mut game = game_with([two_mine_board(), two_mine_board()]);
        game.gain_lives(3);
        assert_eq!(game.lives(), MAX_LIVES);
        assert_eq!(game.score(), 15);

        game.lose_lives(2);
        game.gain_lives(1);
        assert_eq!(game.lives(), 9);
        assert_eq!(game.score(), 15);
    }

    #[test]
    fn test_losing_last_life_ends_game() {
        let [first, second] = [two_mine_board(), two_mine_board()];
        let mut game = Game::builder(Difficulty::Easy)
            .seed(1)
            .starting_lives(1)
            .boards(first, second)
            .build()
            .unwrap();

        game.reveal(Player::One, p(3, 3)).unwrap();
        assert_eq!(game.state(), GameState::Lost);
        assert_eq!(game.lives(), 0);
        assert_eq!(game.score(), 0);
        for player in [Player::One, Player::Two] {
            assert!(game.board(player).cells().all(Cell::is_revealed));
        }
    }

    #[test]
    fn test_finished_game_ignores_moves() {
        let mut game = game_with([two_mine_board(), two_mine_board()]);
        game.reveal(Player::One, p(0, 1)).unwrap();
        assert_eq!(game.state(), GameState::Running);

        // the flat interior cascades over every remaining safe cell
        let outcome = game.reveal(Player::One, p(0, 2)).unwrap();
        assert_eq!(outcome.safe_revealed, 13);

        assert_eq!(game.state(), GameState::Won);
        let (score, lives, turn) = (game.score(), game.lives(), game.current_player());
        assert_eq!(score, 14 + 10 * 5);

        assert_eq!(game.reveal(Player::Two, p(1, 1)), Err(GameError::GameOver));
        assert_eq!(game.toggle_flag(Player::Two, p(0, 0)), Err(GameError::GameOver));
        assert_eq!(game.switch_turn(), turn);
        assert_eq!((game.score(), game.lives()), (score, lives));
        assert_eq!(
            game.board(Player::Two).get_cell(p(0, 0)).unwrap().visibility(),
            Visibility::Revealed
        );
    }

    #[test]
    fn test_switch_turn() {
        let mut game = game_with([two_mine_board(), two_mine_board()]);
        assert_eq!(game.switch_turn(), Player::Two);
        assert_eq!(game.switch_turn(), Player::One);
        assert_eq!(Player::Two.to_string(), "Player 2");
    }

    #[test]
    fn test_restart_keeps_difficulty() {
        let mut game = Game::builder(Difficulty::Medium).seed(4).build().unwrap();
        game.add_score(40);
        game.lose_lives(3);
        game.switch_turn();

        game.restart().unwrap();
        assert_eq!(game.difficulty(), Difficulty::Medium);
        assert_eq!((game.score(), game.lives()), (0, 8));
        assert_eq!(game.current_player(), Player::One);
        assert_eq!(game.board(Player::One).safe_cells_remaining(), 13 * 13 - 26);
    }

    #[test]
    fn test_summary_only_when_finished() {
        let mut game = game_with([two_mine_board(), two_mine_board()]);
        assert_eq!(game.summary(Duration::from_secs(5)), None);

        game.lives = 1;
        game.reveal(Player::One, p(0, 0)).unwrap();
        let summary = game.summary(Duration::from_secs(5)).unwrap();
        assert_eq!(summary.outcome, GameState::Lost);
        assert_eq!(summary.difficulty, Difficulty::Easy);
        assert_eq!(summary.questions_answered, 0);
        assert_eq!(summary.elapsed, Duration::from_secs(5));
    }
}
