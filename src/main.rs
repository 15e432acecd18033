use clap::Parser;
use linelog::cli::{handle_command, Cli};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle command
    handle_command(cli)?;

    Ok(())
}
