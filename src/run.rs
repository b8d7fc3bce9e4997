use crate::assemble::{assemble_with, CommitOrder};
use crate::collect::{plan, repo_order, Collector};
use crate::config::Config;
use crate::error::Result;
use crate::github::{GitHubClient, RepoAccess};
use crate::model::{AggregationResult, DateWindow, RepoPlan};
use crate::output::{render_json, render_ndjson, render_plan, render_text, OutputFormat};
use crate::window;
use anyhow::Context;
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: PathBuf,
    pub dry_run: bool,
    pub from: Option<String>,
    pub to: Option<String>,
    pub format: OutputFormat,
    pub order: CommitOrder,
    pub quiet: bool,
}

pub fn exec(opts: RunOptions) -> anyhow::Result<()> {
    info!(path = %opts.config.display(), "loading configuration");
    let config = Config::load(&opts.config).context("Failed to load configuration")?;

    let today = Local::now().date_naive();
    let window = resolve_window(&config, opts.from.as_deref(), opts.to.as_deref(), today)
        .context("Failed to resolve date range")?;

    info!(
        organizations = ?config.organizations,
        users = ?config.usernames,
        strategy = %config.branch_policy.default_strategy(),
        overrides = config.branch_policy.overrides().len(),
        from = %window.start(),
        to = %window.end(),
        "configuration loaded"
    );

    let client = GitHubClient::new(&config.token).context("Failed to create GitHub client")?;
    let mut collector = Collector::new(client);
    if !opts.quiet && opts.format == OutputFormat::Text {
        collector = collector.with_spinner();
    }

    if opts.dry_run {
        let plans = validate_only(&collector, &config).context("Failed to plan branch queries")?;
        println!("{}", render_plan(&plans, &window));
        println!("Dry run mode - no commits were fetched.");
        return Ok(());
    }

    let result = run_collection(&collector, &config, &window, opts.order)
        .context("Failed to collect commits")?;

    match opts.format {
        OutputFormat::Text => println!("{}", render_text(&result)),
        OutputFormat::Json => println!(
            "{}",
            render_json(&result, &window, &config.organizations, &config.usernames)?
        ),
        OutputFormat::Ndjson => {
            let lines = render_ndjson(&result)?;
            if !lines.is_empty() {
                println!("{lines}");
            }
        }
    }

    Ok(())
}

/// Command-line dates take precedence over the configured `date_range`.
pub fn resolve_window(
    config: &Config,
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<DateWindow> {
    let from = from.or(config.date_range.from.as_deref());
    let to = to.or(config.date_range.to.as_deref());
    window::resolve(from, to, today)
}

/// List repositories and branches and report the selection, never fetching
/// commits.
pub fn validate_only<A: RepoAccess>(collector: &Collector<A>, config: &Config) -> Result<Vec<RepoPlan>> {
    let repositories = collector.discover(&config.organizations)?;
    collector.finish();
    Ok(plan(&repositories, &config.branch_policy))
}

pub fn run_collection<A: RepoAccess>(
    collector: &Collector<A>,
    config: &Config,
    window: &DateWindow,
    order: CommitOrder,
) -> Result<AggregationResult> {
    let repositories = collector.discover(&config.organizations)?;
    let per_repo = collector.collect(&repositories, &config.branch_policy, window, &config.usernames)?;
    let result = assemble_with(per_repo, &repo_order(&repositories), order);
    info!(
        repositories = result.groups.len(),
        commits = result.commit_count(),
        "collection finished"
    );
    Ok(result)
}
