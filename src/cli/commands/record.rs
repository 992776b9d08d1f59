use crate::cli::context::Context;
use crate::core::errors::{LogifyError, Result};
use crate::core::models::log_entry::NewLogEntry;

/// Arguments of `logify record`, as given on the command line.
#[derive(Debug, Default)]
pub struct RecordArgs<'a> {
    pub action: &'a str,
    pub subject_type: Option<&'a str>,
    pub subject_id: Option<&'a str>,
    pub meta: Option<&'a str>,
    pub actor: Option<u64>,
}

/// Execute the `logify record` command.
///
/// Prints the new entry id; in quiet mode the id is the only output.
pub fn execute(ctx: &Context, args: RecordArgs<'_>) -> Result<()> {
    let entry = build_entry(&args)?;
    let store = ctx.open_store()?;
    let id = ctx.service(&store).record(&entry)?;

    if ctx.out.quiet {
        ctx.out.data(&id.to_string());
    } else {
        ctx.out.success(&format!("Recorded '{}' as entry #{id}", entry.action));
    }
    Ok(())
}

fn build_entry(args: &RecordArgs<'_>) -> Result<NewLogEntry> {
    let mut entry = NewLogEntry::new(args.action);
    entry.actor_id = args.actor;
    entry.subject_type = args.subject_type.map(str::to_string);
    entry.subject_id = args.subject_id.map(str::to_string);

    if let Some(raw) = args.meta {
        let value: serde_json::Value =
            serde_json::from_str(raw).map_err(|e| LogifyError::InvalidArgument {
                detail: format!("--meta is not valid JSON: {e}"),
            })?;
        entry = entry.metadata(value);
    }
    Ok(entry)
}
