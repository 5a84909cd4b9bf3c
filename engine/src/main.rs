use minesweeper_kb::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const LAYOUT: &str = "
    ...*......
    ..........
    .*....*...
    ..........
    ....**....
    ..........
    *.......*.
    ...*......
    ......*...
    .*.......*
";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // --- 1. Initialization ---
    let board = Board::from_layout(LAYOUT)?;
    // A fixed seed by default so runs can be replayed; any argument reseeds.
    let seed = match std::env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 0,
    };
    let mut rng = StdRng::seed_from_u64(seed);

    println!("--- Knowledge-Based Minesweeper Bot ---");
    println!("Strategy: Reveal cells proven safe, guess randomly otherwise.");
    println!("Initial Board:");
    print_board(&board, &KnowledgeBase::new(board.height(), board.width()));
    thread::sleep(Duration::from_secs(1));

    // --- 2. Game Loop ---
    let mut move_count = 0;
    let report = autoplay::play_observed(&board, &mut rng, |next, knowledge| {
        move_count += 1;
        println!("\n--- Move #{} ---", move_count);
        match next {
            Move::Safe(_) => println!("Logic found a guaranteed safe cell."),
            Move::Guess(_) => println!("No logically safe move found. Made a random guess..."),
        }
        println!("Bot revealed {}.", next.cell());
        print_board(&board, knowledge);

        // Add a delay to make the game watchable
        thread::sleep(Duration::from_millis(300));
    })?;

    // --- 3. Final Result ---
    println!("\n--- Game Over ---");
    match report.outcome {
        autoplay::Outcome::Won => println!("Result: The bot found every mine!"),
        autoplay::Outcome::Lost(cell) => {
            println!("Result: The bot guessed {} and hit a mine.", cell)
        }
        autoplay::Outcome::Stuck => println!("Result: No valid moves left for the bot to make."),
    }

    let knowledge = &report.knowledge;
    println!(
        "Moves: {}, guesses: {}",
        report.moves.len(),
        report.guesses()
    );
    println!(
        "Known safe: {}, known mines: {}, open sentences: {}",
        knowledge.safe().len(),
        knowledge.mines().len(),
        knowledge.sentences().len()
    );
    for sentence in knowledge.sentences() {
        println!("  {}", sentence);
    }
    Ok(())
}

/// Revealed cells show their count, proven mines an `F`, proven safe but
/// unrevealed cells a `·`, everything else a `■`.
fn print_board(board: &Board, knowledge: &KnowledgeBase) {
    // Print header
    print!("   ");
    for col in 0..board.width() {
        print!("{:^3}", col);
    }
    println!("\n  +{}", "---".repeat(board.width()));

    // Print rows
    for row in 0..board.height() {
        print!("{:^2}|", row);
        for col in 0..board.width() {
            let cell = Cell::new(row, col);
            let display = if knowledge.moves_made().contains(&cell) {
                format!(" {} ", board.nearby_mines(cell))
            } else if knowledge.mines().contains(&cell) {
                " F ".to_string()
            } else if knowledge.safe().contains(&cell) {
                " · ".to_string()
            } else {
                " ■ ".to_string()
            };
            print!("{}", display);
        }
        println!();
    }
    println!();
}
