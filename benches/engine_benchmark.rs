use criterion::{criterion_group, criterion_main, Criterion};
use duosweeper::{Board, Difficulty, Game, GameError, GameState, Player, Position};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Debug, Default)]
struct SweepStats {
    reveals: usize,
    cells_revealed: usize,
    won: bool,
}

/// Reveals every safe cell of the first board in row order.
fn sweep_board(game: &mut Game) -> SweepStats {
    let mut stats = SweepStats::default();
    let safe: Vec<Position> = game
        .board(Player::One)
        .cells()
        .filter(|cell| !cell.is_mine())
        .map(|cell| cell.position())
        .collect();

    for pos in safe {
        match game.reveal(Player::One, pos) {
            Ok(outcome) => {
                stats.reveals += 1;
                stats.cells_revealed += outcome.revealed.len();
            }
            Err(GameError::AlreadyRevealed(_)) => {}
            Err(_) => break,
        }
    }
    stats.won = game.state() == GameState::Won;
    stats
}

fn benchmark_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("Engine");

    for difficulty in Difficulty::ALL {
        let config = difficulty.config();

        group.bench_function(format!("generate {difficulty}"), |b| {
            let mut rng = StdRng::seed_from_u64(0);
            b.iter(|| criterion::black_box(Board::generate(config, &mut rng).unwrap()));
        });

        group.bench_function(format!("sweep {difficulty}"), |b| {
            let mut seed = 0;
            b.iter_with_setup(
                || {
                    seed += 1;
                    Game::builder(difficulty).seed(seed).build().unwrap()
                },
                |mut game| criterion::black_box(sweep_board(&mut game)),
            );
        });

        let mut total_reveals = 0;
        let mut total_cells = 0;
        let mut wins = 0;
        for seed in 0..50 {
            let mut game = Game::builder(difficulty).seed(seed).build().unwrap();
            let stats = sweep_board(&mut game);
            total_reveals += stats.reveals;
            total_cells += stats.cells_revealed;
            wins += stats.won as usize;
        }
        println!("\n{difficulty} ({}x{}):", config.rows, config.cols);
        println!("Average clicks to clear: {:.1}", total_reveals as f64 / 50.0);
        println!(
            "Average cells per click: {:.1}",
            total_cells as f64 / total_reveals.max(1) as f64
        );
        println!("Games won: {wins}/50");
    }

    group.finish();
}

criterion_group!(benches, benchmark_engine);
criterion_main!(benches);
