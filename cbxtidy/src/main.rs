use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cbxtidy::create::{self, CreateContext, CreateVerdict};
use cbxtidy::pipeline::{self, ProcessContext, Verdict};
use cbxtidy::rename::{title, volume, RenameOutcome};
use cbxtidy::report::{BatchSummary, ConsoleReporter, JsonReporter, Outcome, PathRecord, Reporter};
use cbxtidy::tags::{CreateTags, ProcessTags, SidecarStore, TagStore};

mod cli;
use cli::{Cli, Command};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let store = SidecarStore::new();
    let mut reporter: Box<dyn Reporter> = if cli.json {
        Box::new(JsonReporter::stdout())
    } else {
        Box::new(ConsoleReporter::stdout())
    };
    let mut summary = BatchSummary::default();
    let use_trash = !cli.no_trash;

    // One path at a time, always through to a terminal state; a bad file
    // never stops the batch.
    match &cli.command {
        Command::Process { paths } => {
            let tags = ProcessTags::default();
            let ctx = ProcessContext {
                tags: &tags,
                store: &store,
                use_trash,
            };
            for path in paths {
                let record = match pipeline::process_path(path, &ctx) {
                    Ok(outcome) => process_record(path, outcome),
                    Err(e) => PathRecord::error(path, e.to_string()),
                };
                summary.tally(&record);
                reporter.record(&record);
            }
        }
        Command::Create { dirs } => {
            let tags = CreateTags::default();
            let ctx = CreateContext {
                tags: &tags,
                store: &store,
                use_trash,
            };
            for dir in dirs {
                let record = match create::create_from_dir(dir, &ctx) {
                    Ok(outcome) => create_record(dir, outcome),
                    Err(e) => PathRecord::error(dir, e.to_string()),
                };
                summary.tally(&record);
                reporter.record(&record);
            }
        }
        Command::RenameVolume { paths } => {
            for path in paths {
                let record = match volume::rename_volume(path) {
                    Ok(outcome) => rename_record(path, outcome, &store),
                    Err(e) => PathRecord::error(path, e.to_string()),
                };
                summary.tally(&record);
                reporter.record(&record);
            }
        }
        Command::TitleCase { paths } => {
            // Deepest paths first, so renaming a directory cannot invalidate
            // a queued child path.
            let mut ordered: Vec<&PathBuf> = paths.iter().collect();
            ordered.sort_by_key(|p| std::cmp::Reverse(p.components().count()));
            for path in ordered {
                let record = match title::rename_title_case(path) {
                    Ok(outcome) => rename_record(path, outcome, &store),
                    Err(e) => PathRecord::error(path, e.to_string()),
                };
                summary.tally(&record);
                reporter.record(&record);
            }
        }
    }

    reporter.summary(&summary);
    ExitCode::from(summary.exit_code())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn process_record(input: &Path, outcome: pipeline::ProcessOutcome) -> PathRecord {
    let kind = match outcome.verdict {
        Verdict::Valid => Outcome::Valid,
        Verdict::Corrupt => Outcome::Corrupt,
        Verdict::Collision => Outcome::Collision,
        Verdict::RepackFailed => Outcome::RepackFailed,
        Verdict::Skipped => Outcome::Skipped,
    };
    PathRecord::new(input, kind)
        .with_final_path(&outcome.final_path)
        .with_detail(outcome.detail)
}

fn create_record(input: &Path, outcome: create::CreateOutcome) -> PathRecord {
    let kind = match outcome.verdict {
        CreateVerdict::Created => Outcome::Created,
        CreateVerdict::Corrupt => Outcome::Corrupt,
        CreateVerdict::Collision => Outcome::Collision,
        CreateVerdict::CreateFailed => Outcome::CreateFailed,
        CreateVerdict::CleanupFailed => Outcome::CleanupFailed,
        CreateVerdict::Skipped => Outcome::Skipped,
    };
    PathRecord::new(input, kind)
        .with_final_path(&outcome.final_path)
        .with_detail(outcome.detail)
}

fn rename_record(input: &Path, outcome: RenameOutcome, store: &dyn TagStore) -> PathRecord {
    match outcome {
        RenameOutcome::Renamed { to } => {
            // Tags ride along with the file
            if let Err(e) = store.relocate(input, &to) {
                tracing::warn!("Failed to move tags for {:?}: {}", input, e);
            }
            PathRecord::new(input, Outcome::Renamed).with_final_path(&to)
        }
        RenameOutcome::Unchanged => PathRecord::new(input, Outcome::Unchanged),
        RenameOutcome::Collision { target } => PathRecord::new(input, Outcome::Collision)
            .with_detail(Some(format!("{} already exists", target.display()))),
        RenameOutcome::Skipped { reason } => {
            PathRecord::new(input, Outcome::Skipped).with_detail(Some(reason))
        }
    }
}
