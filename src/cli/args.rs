// PoseFlow 🧘 AGPL-3.0 License - https://poseflow.dev/license

use clap::{Args, Parser, Subcommand};

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Classify Options:
    --model, -m <MODEL>        Path to ONNX classifier [default: poseflow-classifier.onnx]
    --input, -i <INPUT>        Landmarks JSON file, or '-' for stdin
    --threshold, -t <VALUE>    Acceptance threshold in [0, 1] [default: 0.8]
    --threads <N>              ONNX Runtime intra-op threads (0 = auto)
    --verbose                  Show verbose output

The input JSON carries 17 [x, y] keypoints in COCO order, normalized to
the [0, 1] image range, and may override the threshold:
    {"landmarks": [[0.5, 0.3], ...], "threshold": 0.9}

Examples:
    poseflow-inference classify --input pose.json
    poseflow-inference classify -m poseflow-classifier.onnx -i pose.json -t 0.95
    cat pose.json | poseflow-inference classify --input -"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a pose from a 17-keypoint landmark set
    Classify(ClassifyArgs),
}

/// Arguments for the classify command.
#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Path to ONNX classifier artifact
    #[arg(short, long)]
    pub model: Option<String>,

    /// Landmarks JSON file, or '-' to read from stdin
    #[arg(short, long)]
    pub input: Option<String>,

    /// Acceptance threshold in [0, 1]; overrides the request's value
    #[arg(short, long)]
    pub threshold: Option<f32>,

    /// ONNX Runtime intra-op threads (0 = auto)
    #[arg(long, default_value_t = 0)]
    pub threads: usize,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_classify_args_defaults() {
        let args = Cli::parse_from(["app", "classify", "--input", "pose.json"]);
        match args.command {
            Commands::Classify(classify_args) => {
                assert!(classify_args.model.is_none());
                assert_eq!(classify_args.input, Some("pose.json".to_string()));
                assert!(classify_args.threshold.is_none());
                assert_eq!(classify_args.threads, 0);
                assert!(classify_args.verbose);
            }
        }
    }

    #[test]
    fn test_classify_args_custom() {
        let args = Cli::parse_from([
            "app",
            "classify",
            "--model",
            "custom.onnx",
            "--input",
            "-",
            "--threshold",
            "0.95",
            "--verbose",
            "false",
        ]);
        match args.command {
            Commands::Classify(classify_args) => {
                assert_eq!(classify_args.model, Some("custom.onnx".to_string()));
                assert_eq!(classify_args.input, Some("-".to_string()));
                assert!((classify_args.threshold.unwrap() - 0.95).abs() < f32::EPSILON);
                assert!(!classify_args.verbose);
            }
        }
    }
}
