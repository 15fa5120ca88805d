use clap::Parser;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(
    name = "upper",
    about = "Upgrade everything installed through apt, snap, npm and pipx",
    version
)]
pub struct Cli {
    /// Print information helpful for debugging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }
}
