use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cardbox", version, about = "Cardbox CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a review session over the cards due today
    Review(commands::review::ReviewArgs),
    /// Deck management
    Deck {
        #[command(subcommand)]
        action: commands::deck::DeckAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    // Diagnostics go to stderr; stdout is the review surface.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Review(args) => commands::review::run(args),
        Commands::Deck { action } => commands::deck::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
