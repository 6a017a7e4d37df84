// PoseFlow 🧘 AGPL-3.0 License - https://poseflow.dev/license

use std::io::Read;
use std::path::Path;
use std::process;
use std::time::Instant;

use crate::cli::args::ClassifyArgs;
use crate::config::ClassifyConfig;
use crate::download::{DEFAULT_MODEL, try_download_model};
use crate::error::Result;
use crate::handle::SharedClassifier;
use crate::pipeline::{ClassifyRequest, classify_landmarks};
use crate::{VERSION, error, verbose, warn};

/// Run pose classification from the command line.
pub fn run_classification(args: &ClassifyArgs) {
    crate::cli::logging::set_verbose(args.verbose);

    let model_is_default = args.model.is_none();
    let model_path = args
        .model
        .clone()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    if model_is_default && args.verbose {
        warn!("'model' argument is missing. Using default '--model={DEFAULT_MODEL}'.");
    }

    // Default artifact is fetched on demand; custom paths must exist.
    if !Path::new(&model_path).exists() {
        if let Err(e) = try_download_model(&model_path) {
            error!("Error fetching model: {e}");
            process::exit(1);
        }
    }

    let request = match read_request(args) {
        Ok(r) => r,
        Err(e) => {
            error!("Error reading input: {e}");
            process::exit(1);
        }
    };

    let mut config = ClassifyConfig::new().with_threads(args.threads);
    if let Some(t) = args.threshold {
        config = config.with_threshold(t);
    }
    if let Err(e) = config.validate() {
        error!("{e}");
        process::exit(1);
    }

    let classifier = SharedClassifier::new(&model_path, config);

    let start_load = Instant::now();
    let model = match classifier.get() {
        Ok(m) => m,
        Err(e) => {
            error!("Error loading model: {e}");
            process::exit(1);
        }
    };
    let load_time = start_load.elapsed().as_secs_f64() * 1000.0;

    println!("PoseFlow {VERSION} 🧘 Rust ONNX");
    verbose!(
        "classifier summary: {} classes, embedding_len={}, loaded in {:.1}ms",
        model.num_classes(),
        model.embedding_len(),
        load_time
    );
    verbose!("");

    // CLI threshold overrides the request's own.
    let mut request = request;
    if args.threshold.is_some() {
        request.threshold = args.threshold;
    }

    let start_classify = Instant::now();
    let result = match classify_landmarks(&model, &request) {
        Ok(r) => r,
        Err(e) => {
            error!("Error classifying pose: {e}");
            process::exit(1);
        }
    };
    let classify_time = start_classify.elapsed().as_secs_f64() * 1000.0;

    verbose!(
        "pose 1/1: {}{:.1}ms (threshold {:.2}, {})",
        result.verbose(),
        classify_time,
        result.threshold,
        if result.passed { "passed" } else { "not passed" }
    );
    verbose!("");

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            error!("Error serializing result: {e}");
            process::exit(1);
        }
    }
}

/// Read the request JSON from the input file or stdin.
fn read_request(args: &ClassifyArgs) -> Result<ClassifyRequest> {
    let raw = match args.input.as_deref() {
        None | Some("-") => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
        Some(path) => std::fs::read_to_string(path)?,
    };

    serde_json::from_str(&raw).map_err(|e| {
        crate::error::ClassifyError::InvalidInput(format!("malformed request JSON: {e}"))
    })
}
