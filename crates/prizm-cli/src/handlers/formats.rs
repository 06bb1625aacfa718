use serde::Serialize;

use crate::context::CliContext;
use crate::output;
use prizm_domain::ImportSource;

#[derive(Serialize)]
struct FormatInfo {
    id: ImportSource,
    name: &'static str,
}

pub fn handle(ctx: &CliContext) -> anyhow::Result<()> {
    let formats = ctx
        .factory()
        .supported_formats()
        .into_iter()
        .map(|source| FormatInfo {
            id: source,
            name: source.display_name(),
        })
        .collect();
    output::output_list::<FormatInfo>(formats);
    Ok(())
}
