use anyhow::Context;

use crate::cli::ImportArgs;
use crate::context::{read_input, CliContext};
use crate::handlers::file_name;
use crate::output;
use prizm_import::{AdapterFactory, ImportInput, InMemoryUserDirectory, NativeAdapter, UserMatcher};

pub fn handle(ctx: &CliContext, args: ImportArgs) -> anyhow::Result<()> {
    let mut settings = ctx.settings().clone();
    for (header, field) in &args.mappings {
        settings
            .field_overrides
            .insert(header.clone(), field.as_str().to_string());
    }
    let factory = AdapterFactory::new(settings);

    let bytes = read_input(&args.file)?;
    let mut input = ImportInput::from_bytes(&bytes);
    if let Some(name) = file_name(&args.file) {
        input = input.with_filename(name);
    }

    let result = match &args.users {
        Some(path) => {
            let directory = InMemoryUserDirectory::load_from_file(path)
                .with_context(|| format!("Failed to load users from {}", path.display()))?;
            tracing::debug!(users = directory.len(), "Loaded platform users");
            let mut matcher = UserMatcher::new(&directory).with_organization(args.organization);
            factory.import_with_users(&input, args.format, &mut matcher)
        }
        None => factory.import(&input, args.format),
    };

    if !result.success {
        let message = result
            .errors
            .first()
            .map(|error| error.to_string())
            .unwrap_or_else(|| "Import failed".to_string());
        output::output_failure(&message, &result);
    }

    if let Some(path) = &args.output {
        let exported = NativeAdapter::export(&result)?;
        std::fs::write(path, exported)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Wrote native export to {}", path.display());
    }

    output::output_success(&result);
    Ok(())
}
