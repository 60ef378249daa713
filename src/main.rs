use duosweeper::{
    AnswerOutcome, CellContent, CellView, Difficulty, Game, GameError, GameState, Player,
    Position, Question, QuestionBank, QuestionLevel, Visibility,
};
use std::io::{self, Write};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Reveal(Position),
    Flag(Position),
    Activate(Position),
    SwitchTurn,
    Restart,
    Quit,
}

fn main() {
    env_logger::init();

    let difficulty = match std::env::args().nth(1).map(|arg| arg.parse::<Difficulty>()) {
        Some(Ok(difficulty)) => difficulty,
        Some(Err(e)) => {
            eprintln!("{e}");
            return;
        }
        None => Difficulty::Easy,
    };

    match run_game(difficulty) {
        Ok(_) => println!("Thanks for playing!"),
        Err(e) => eprintln!("Game error: {}", e),
    }
}

fn run_game(difficulty: Difficulty) -> Result<(), GameError> {
    let mut game = Game::builder(difficulty)
        .question_source(QuestionBank::new(sample_questions()))
        .presenter(ask_question)
        .build()?;
    let mut started = Instant::now();

    while game.state() == GameState::Running {
        print_game(&game);

        let Some(command) = get_user_input() else {
            continue;
        };
        let player = game.current_player();
        let result = match command {
            Command::Reveal(pos) => game.reveal(player, pos).map(|_| ()),
            Command::Flag(pos) => game.toggle_flag(player, pos).map(|_| ()),
            Command::Activate(pos) => game.activate(player, pos).map(|_| ()),
            Command::SwitchTurn => {
                game.switch_turn();
                Ok(())
            }
            Command::Restart => {
                started = Instant::now();
                game.restart()
            }
            Command::Quit => return Ok(()),
        };

        if let Some(message) = game.take_message() {
            println!("{message}");
        } else if let Err(e) = result {
            println!("Error: {}", e);
        }
    }

    print_game(&game);
    match game.state() {
        GameState::Won => println!("Congratulations! You won!"),
        _ => println!("Game Over!"),
    }
    if let Some(summary) = game.summary(started.elapsed()) {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Could not serialize summary: {e}"),
        }
    }

    Ok(())
}

fn print_game(game: &Game) {
    println!(
        "\nScore: {}  Lives: {}  Turn: {}",
        game.score(),
        game.lives(),
        game.current_player()
    );
    for player in [Player::One, Player::Two] {
        let board = game.board(player);
        println!("{} board (mines left: {})", player, board.mines_left());
        print_board(board.rows_view());
    }
}

fn print_board(rows: impl Iterator<Item = Vec<CellView>>) {
    let rows: Vec<Vec<CellView>> = rows.collect();
    let width = rows.first().map_or(0, Vec::len);

    // Print column numbers
    print!("   ");
    for col in 0..width {
        print!("{:>2}", col);
    }
    println!();

    for (row, cells) in rows.iter().enumerate() {
        print!("{:>2} ", row);
        for cell in cells {
            print!(" {}", cell_symbol(cell));
        }
        println!();
    }
}

fn cell_symbol(cell: &CellView) -> char {
    match (cell.visibility, cell.content) {
        (Visibility::Hidden, _) => '□',
        (Visibility::Flagged, _) => '⚑',
        (Visibility::Revealed, Some(CellContent::Mine)) => '*',
        (Visibility::Revealed, Some(CellContent::Number(n))) => char::from(b'0' + n),
        (Visibility::Revealed, Some(CellContent::Question)) if cell.used => 'q',
        (Visibility::Revealed, Some(CellContent::Question)) => '?',
        (Visibility::Revealed, Some(CellContent::Surprise)) if cell.used => 's',
        (Visibility::Revealed, Some(CellContent::Surprise)) => '!',
        (Visibility::Revealed, _) => ' ',
    }
}

fn get_user_input() -> Option<Command> {
    print!("Enter command (r/f/a row col, t, n, q): ");
    io::stdout().flush().ok()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input).ok()?;
    let mut parts = input.split_whitespace();

    let action = parts.next()?.chars().next()?;
    let mut position = || -> Option<Position> {
        let row = parts.next()?.parse().ok()?;
        let col = parts.next()?.parse().ok()?;
        Some(Position::new(row, col))
    };

    match action {
        'r' => position().map(Command::Reveal),
        'f' => position().map(Command::Flag),
        'a' => position().map(Command::Activate),
        't' => Some(Command::SwitchTurn),
        'n' => Some(Command::Restart),
        'q' => Some(Command::Quit),
        _ => {
            println!("Invalid action. Use 'r' to reveal, 'f' to flag, 'a' to activate");
            None
        }
    }
}

fn ask_question(question: &Question) -> AnswerOutcome {
    println!("\n[{}] {}", question.level, question.prompt);
    for (index, option) in question.options.iter().enumerate() {
        println!("  {}) {}", index + 1, option);
    }
    print!("Answer 1-4, anything else skips: ");
    if io::stdout().flush().is_err() {
        return AnswerOutcome::Skipped;
    }

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return AnswerOutcome::Skipped;
    }
    let choice = input
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|choice| (1..=4).contains(choice))
        .map(|choice| choice - 1);

    let outcome = question.evaluate(choice);
    if outcome == AnswerOutcome::Wrong {
        println!("The answer was: {}", question.options[question.correct]);
    }
    outcome
}

fn sample_questions() -> Vec<Question> {
    let question = |id, level, prompt: &str, options: [&str; 4], correct| Question {
        id,
        prompt: prompt.to_string(),
        options: options.map(String::from),
        correct,
        level,
    };

    vec![
        question(
            1,
            QuestionLevel::Easy,
            "Which keyword declares an immutable binding in Rust?",
            ["var", "let", "const mut", "static mut"],
            1,
        ),
        question(
            2,
            QuestionLevel::Medium,
            "What does the `?` operator do on an `Err` value?",
            ["Panics", "Ignores it", "Returns it early", "Logs it"],
            2,
        ),
        question(
            3,
            QuestionLevel::Hard,
            "Which trait lets a type be moved between threads?",
            ["Sync", "Send", "Unpin", "Copy"],
            1,
        ),
        question(
            4,
            QuestionLevel::Expert,
            "What variance does `&'a mut T` have in `T`?",
            ["Covariant", "Contravariant", "Invariant", "Bivariant"],
            2,
        ),
        question(
            5,
            QuestionLevel::Easy,
            "How many neighbours does an interior cell have?",
            ["4", "6", "8", "9"],
            2,
        ),
        question(
            6,
            QuestionLevel::Medium,
            "Which collection gives FIFO order with O(1) push and pop at both ends?",
            ["Vec", "VecDeque", "BTreeSet", "HashMap"],
            1,
        ),
    ]
}
