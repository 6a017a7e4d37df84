// PoseFlow 🧘 AGPL-3.0 License - https://poseflow.dev/license

use clap::Parser;

use poseflow_inference::cli::args::{Cli, Commands};
use poseflow_inference::cli::classify::run_classification;

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Classify(args) => run_classification(&args),
    }
}
