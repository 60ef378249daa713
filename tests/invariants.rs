use duosweeper::{
    AnswerOutcome, Board, CellContent, Difficulty, FlagOutcome, Game, GameState, Player,
    Position, Question, QuestionBank, QuestionLevel, MAX_LIVES,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Clone, Copy)]
enum Move {
    Reveal,
    Flag,
    Activate,
    SwitchTurn,
}

fn moves() -> impl Strategy<Value = Vec<(Move, bool, usize, usize)>> {
    let kind = prop_oneof![
        4 => Just(Move::Reveal),
        3 => Just(Move::Flag),
        2 => Just(Move::Activate),
        1 => Just(Move::SwitchTurn),
    ];
    prop::collection::vec((kind, any::<bool>(), 0..9usize, 0..9usize), 0..120)
}

fn questions() -> QuestionBank {
    let levels = QuestionLevel::ALL.iter().cycle().take(20);
    QuestionBank::new(
        levels
            .enumerate()
            .map(|(id, &level)| Question {
                id: id as u32,
                prompt: format!("Question {id}"),
                options: ["a", "b", "c", "d"].map(String::from),
                correct: id % 4,
                level,
            })
            .collect(),
    )
}

fn unrevealed_safe_cells(board: &Board) -> usize {
    board
        .cells()
        .filter(|cell| !cell.is_mine() && !cell.is_revealed())
        .count()
}

proptest! {
    #[test]
    fn generated_boards_respect_layout_rules(seed in any::<u64>(), difficulty in 0..3usize) {
        let config = Difficulty::ALL[difficulty].config();
        let mut rng = StdRng::seed_from_u64(seed);
        let board = Board::generate(config, &mut rng).unwrap();
        let (rows, cols) = board.dimensions();

        prop_assert_eq!(board.cells().filter(|cell| cell.is_mine()).count(), config.mines);
        let specials: Vec<_> = board.cells().filter(|cell| cell.content().is_special()).collect();
        prop_assert_eq!(specials.len(), config.questions + config.surprises);
        for cell in specials {
            let pos = cell.position();
            prop_assert_eq!(board.count_adjacent_mines(pos), 0);
            prop_assert!(pos.neighbors(rows, cols).all(|n| !board.get_cell(n).unwrap().is_mine()));
        }
        prop_assert_eq!(board.safe_cells_remaining(), unrevealed_safe_cells(&board));
    }

    #[test]
    fn play_keeps_invariants(seed in any::<u64>(), moves in moves()) {
        let mut game = Game::builder(Difficulty::Easy)
            .seed(seed)
            .starting_score(30)
            .question_source(questions())
            .presenter(|q: &Question| q.evaluate(Some(1)))
            .build()
            .unwrap();
        let mut remaining = [
            game.board(Player::One).safe_cells_remaining(),
            game.board(Player::Two).safe_cells_remaining(),
        ];

        for (kind, second, row, col) in moves {
            let player = if second { Player::Two } else { Player::One };
            let pos = Position::new(row, col);
            let finished = game.state() != GameState::Running;
            let before = (game.score(), game.lives(), game.current_player());

            match kind {
                Move::Reveal => {
                    let again = game.board(player).get_cell(pos).unwrap().is_revealed();
                    let result = game.reveal(player, pos);
                    if again {
                        prop_assert!(result.is_err());
                    }
                }
                Move::Flag => {
                    let placed = game.board(player).flags_placed();
                    if let Ok(FlagOutcome::Placed { .. }) = game.toggle_flag(player, pos) {
                        if game.state() == GameState::Running {
                            prop_assert_eq!(game.board(player).flags_placed(), placed + 1);
                        }
                    }
                }
                Move::Activate => {
                    let used = game.board(player).get_cell(pos).unwrap().is_used();
                    let result = game.activate(player, pos);
                    if used {
                        prop_assert!(result.is_err());
                    }
                }
                Move::SwitchTurn => {
                    game.switch_turn();
                }
            }

            if finished {
                prop_assert_eq!((game.score(), game.lives(), game.current_player()), before);
            }
            prop_assert!(game.lives() <= MAX_LIVES);
            prop_assert_eq!(game.state() == GameState::Lost, game.lives() == 0);

            for player in [Player::One, Player::Two] {
                let board = game.board(player);
                prop_assert!(board.flags_placed() <= board.hidden_mines());
                prop_assert_eq!(board.flags_placed(), board.cells().filter(|cell| cell.is_flagged()).count());
                let now = board.safe_cells_remaining();
                prop_assert!(now <= remaining[player.index()]);
                prop_assert_eq!(now, unrevealed_safe_cells(board));
                remaining[player.index()] = now;
            }
        }
    }

    #[test]
    fn special_cells_activate_once(seed in any::<u64>()) {
        let mut game = Game::builder(Difficulty::Easy)
            .seed(seed)
            .starting_score(1_000)
            .question_source(questions())
            .presenter(|_: &Question| AnswerOutcome::Wrong)
            .build()
            .unwrap();
        let specials: Vec<Position> = game
            .board(Player::One)
            .cells()
            .filter(|cell| matches!(cell.content(), CellContent::Question | CellContent::Surprise))
            .map(|cell| cell.position())
            .collect();

        for pos in specials {
            if game.state() != GameState::Running {
                break;
            }
            let _ = game.reveal(Player::One, pos);
            if game.state() != GameState::Running {
                break;
            }
            prop_assert!(game.activate(Player::One, pos).is_ok());
            if game.state() != GameState::Running {
                break;
            }
            let (score, lives) = (game.score(), game.lives());
            prop_assert!(game.activate(Player::One, pos).is_err());
            prop_assert_eq!((game.score(), game.lives()), (score, lives));
        }
    }
}
