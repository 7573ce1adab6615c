use blackjack_rs::config::GameConfig;
use blackjack_rs::game::Game;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Play seeded blackjack rounds from a JSON table configuration.
#[derive(Debug, Parser)]
#[command(name = "blackjack-rs", version = blackjack_rs::VERSION)]
struct Cli {
    /// Path to a JSON game configuration; defaults to a six-deck table.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of rounds to play.
    #[arg(short, long, default_value_t = 1)]
    rounds: u32,

    /// Override the configured RNG seed.
    #[arg(short, long)]
    seed: Option<u64>,
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str::<GameConfig>(&raw)?
        }
        None => GameConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.validate()?;

    let mut game = Game::new(config)?;
    for round in 1..=cli.rounds {
        if round > 1 {
            game.reset()?;
        }
        let summary = game.play_round()?;
        println!("round {round}: dealer {:?}", summary.dealer);
        for player in &summary.players {
            let outcomes: Vec<String> =
                player.hands.iter().map(|h| format!("{:?} ({:+.2})", h.outcome, h.credit - h.wager)).collect();
            println!(
                "  {} bankroll {:.2} [{}]",
                player.name,
                player.bankroll,
                outcomes.join(", ")
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
