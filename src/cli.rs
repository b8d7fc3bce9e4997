use crate::assemble::CommitOrder;
use crate::config::DEFAULT_CONFIG_PATH;
use crate::output::OutputFormat;
use crate::run::{self, RunOptions};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "commit-tracker")]
#[command(about = "Collect commits by tracked users across GitHub organizations, grouped by repository")]
#[command(version)]
pub struct Cli {
    #[arg(short, long, help = "Configuration file path", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    #[arg(long, help = "Validate configuration and show the branch plan without fetching commits")]
    pub dry_run: bool,

    #[arg(long, help = "Start date (YYYY-MM-DD), overrides date_range.from")]
    pub from: Option<String>,

    #[arg(long, help = "End date (YYYY-MM-DD), overrides date_range.to")]
    pub to: Option<String>,

    #[arg(long, help = "Output as JSON", conflicts_with = "ndjson")]
    pub json: bool,

    #[arg(long, help = "Output as NDJSON, one commit per line")]
    pub ndjson: bool,

    #[arg(long, value_enum, default_value_t = CommitOrder::Collected, help = "Commit order within a repository")]
    pub order: CommitOrder,

    #[arg(short, long, action = clap::ArgAction::Count, help = "Increase log verbosity (-v info, -vv debug)")]
    pub verbose: u8,

    #[arg(short, long, help = "Hide the progress spinner")]
    pub quiet: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Default log directive when `RUST_LOG` is not set.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.ndjson {
            OutputFormat::Ndjson
        } else {
            OutputFormat::Text
        }
    }

    pub fn execute(self) -> Result<()> {
        let format = self.format();
        run::exec(RunOptions {
            config: self.config,
            dry_run: self.dry_run,
            from: self.from,
            to: self.to,
            format,
            order: self.order,
            quiet: self.quiet,
        })
    }
}
