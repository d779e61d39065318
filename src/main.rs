use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use serde_json::json;
use tracing::error;

use affinity_eval::checkpoint::{EpochOrdering, list_checkpoints, select_top_n};
use affinity_eval::config::EvalConfig;
use affinity_eval::error::Result;
use affinity_eval::logging;
use affinity_eval::pipeline::driver::rescore;
use affinity_eval::pipeline::stage3_aggregate::Reduction;
use affinity_eval::pipeline::stage4_sink::result_path;
use affinity_eval::report::json::rescore_json;
use affinity_eval::report::text::render_rescore_text;

#[derive(Debug, Parser)]
#[command(
    name = "affinity-eval",
    version,
    about = "Checkpoint selection and per-entity scoring of affinity regression runs"
)]
struct Cli {
    /// JSON evaluation config; command-line flags override its fields.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the checkpoints a bulk evaluation would visit, newest key first.
    Checkpoints {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long)]
        top_n: Option<usize>,
        /// Order epochs numerically instead of by their string form.
        #[arg(long)]
        numeric_epochs: bool,
        #[arg(long)]
        suffix: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Re-aggregate and score per-sample result tables.
    Rescore {
        #[arg(long = "table", required = true, num_args = 1..)]
        tables: Vec<PathBuf>,
        #[arg(long, value_enum)]
        reduction: Option<Reduction>,
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    match run(cli) {
        Ok(0) => {}
        Ok(failed) => {
            error!("{failed} table(s) could not be scored");
            std::process::exit(2);
        }
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    }
}

/// Returns the number of inputs that were skipped.
fn run(cli: Cli) -> Result<usize> {
    let base = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::Checkpoints {
            dir,
            top_n,
            numeric_epochs,
            suffix,
            json,
        } => {
            let config = apply_checkpoint_overrides(base, top_n, numeric_epochs, suffix)?;
            let records = list_checkpoints(&dir, &config.pattern)?;
            let selected = select_top_n(&records, config.top_n, config.ordering, config.descending);
            if json {
                let items: Vec<_> = selected
                    .iter()
                    .map(|r| {
                        json!({
                            "epoch": r.epoch.as_str(),
                            "checkpoint": r.path.display().to_string(),
                            "results": result_path(&r.path, &config.suffix).display().to_string(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                for r in &selected {
                    println!(
                        "{}\t{}\t{}",
                        r.epoch,
                        r.path.display(),
                        result_path(&r.path, &config.suffix).display()
                    );
                }
            }
            Ok(0)
        }
        Command::Rescore {
            tables,
            reduction,
            json,
        } => {
            let reduction = reduction.unwrap_or(base.reduction);
            let mut failed = 0usize;
            let mut docs = Vec::new();
            for table in &tables {
                match rescore(table, &reduction) {
                    Ok(outcome) => {
                        if json {
                            docs.push(rescore_json(&outcome));
                        } else {
                            print!("{}", render_rescore_text(&outcome));
                        }
                    }
                    Err(err) => {
                        error!(table = %table.display(), kind = err.kind(), "skipping table: {err}");
                        failed += 1;
                    }
                }
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&docs)?);
            }
            Ok(failed)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<EvalConfig> {
    match path {
        Some(p) => EvalConfig::from_json_file(p),
        None => Ok(EvalConfig::default()),
    }
}

fn apply_checkpoint_overrides(
    mut config: EvalConfig,
    top_n: Option<usize>,
    numeric_epochs: bool,
    suffix: Option<String>,
) -> Result<EvalConfig> {
    if let Some(n) = top_n {
        config.top_n = n;
    }
    if numeric_epochs {
        config.ordering = EpochOrdering::Numeric;
    }
    if let Some(s) = suffix {
        config.suffix = s;
    }
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
#[path = "../tests/src_inline/main_inline.rs"]
mod tests;
