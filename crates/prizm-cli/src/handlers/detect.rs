use serde::Serialize;

use crate::cli::DetectArgs;
use crate::context::{read_input, CliContext};
use crate::handlers::file_name;
use crate::output;
use prizm_domain::ImportSource;
use prizm_import::{DetectionCandidate, ImportInput};

#[derive(Serialize)]
struct DetectReport {
    source: ImportSource,
    confidence: f64,
    candidates: Vec<DetectionCandidate>,
}

pub fn handle(ctx: &CliContext, args: DetectArgs) -> anyhow::Result<()> {
    let bytes = read_input(&args.file)?;
    let mut input = ImportInput::from_bytes(&bytes);
    if let Some(name) = file_name(&args.file) {
        input = input.with_filename(name);
    }

    let factory = ctx.factory();
    let candidates = factory.detector().detect_all(&input);
    match factory.detect_format(&input) {
        Some(found) => output::output_success(DetectReport {
            source: found.source,
            confidence: found.confidence,
            candidates,
        }),
        None => output::output_error(&format!(
            "Could not detect the format of {}",
            args.file.display()
        )),
    }
    Ok(())
}
