use clap::Parser;
use tracing_subscriber::EnvFilter;

use logify::cli::commands::record::RecordArgs;
use logify::cli::context::Context;
use logify::cli::{Cli, Commands, commands, output};
use logify::core::errors::Result;

fn main() {
    let args = Cli::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(&args) {
        output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}

fn run(args: &Cli) -> Result<()> {
    let ctx = Context::from_cli(args)?;

    match &args.command {
        Commands::Init => commands::init::execute(&ctx),
        Commands::Deactivate => commands::lifecycle::deactivate(&ctx),
        Commands::Upgrade => commands::lifecycle::upgrade(&ctx),
        Commands::Uninstall { yes } => commands::lifecycle::uninstall(&ctx, *yes),
        Commands::Record {
            action,
            subject_type,
            subject_id,
            meta,
            actor,
        } => commands::record::execute(
            &ctx,
            RecordArgs {
                action,
                subject_type: subject_type.as_deref(),
                subject_id: subject_id.as_deref(),
                meta: meta.as_deref(),
                actor: *actor,
            },
        ),
        Commands::List {
            filter,
            page,
            per_page,
            json,
        } => commands::list::execute(&ctx, filter, *page, *per_page, *json),
        Commands::Count { filter } => commands::list::count(&ctx, filter),
        Commands::Delete { ids } => commands::delete::execute(&ctx, ids),
        Commands::Cleanup { days } => commands::cleanup::execute(&ctx, *days),
        Commands::Values { field } => commands::values::execute(&ctx, *field),
        Commands::Stats => commands::values::stats(&ctx),
    }
}

/// Diagnostics go to stderr so command output stays pipeable. `LOGIFY_LOG`
/// takes precedence over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "logify=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("LOGIFY_LOG").unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
