use crate::error::Result;
use crate::model::{short_name, AggregationResult, DateWindow, RepoPlan, TrackerOutput, SCHEMA_VERSION};
use chrono::Utc;
use clap::ValueEnum;
use console::style;
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Ndjson,
}

fn scope_prefix() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^.*\([^)]+\):\s*").ok())
        .as_ref()
}

/// Strip the bullet and any `type(scope):` prefix from a body item.
///
/// `"* feat(api): add paging"` becomes `"add paging"`.
pub fn clean_body_item(line: &str) -> String {
    let item = line.trim().trim_start_matches('*').trim();
    match scope_prefix() {
        Some(re) => re.replace(item, "").trim().to_string(),
        None => item.to_string(),
    }
}

/// Body lines that start with `*`, cleaned; everything else is dropped.
pub fn body_items(message: &str) -> Vec<String> {
    message
        .lines()
        .skip(1)
        .map(str::trim)
        .filter(|l| l.starts_with('*'))
        .map(clean_body_item)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Headers use the short repository name unless two groups share it.
fn display_names(result: &AggregationResult) -> HashMap<&str, &str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for g in &result.groups {
        *counts.entry(short_name(&g.repository)).or_insert(0) += 1;
    }
    result
        .groups
        .iter()
        .map(|g| {
            let short = short_name(&g.repository);
            let shown = if counts.get(short).copied().unwrap_or(0) > 1 {
                g.repository.as_str()
            } else {
                short
            };
            (g.repository.as_str(), shown)
        })
        .collect()
}

pub fn render_text(result: &AggregationResult) -> String {
    if result.is_empty() {
        return "No commits found.".to_string();
    }

    let names = display_names(result);
    let mut lines = Vec::new();

    for group in &result.groups {
        let name = names.get(group.repository.as_str()).copied().unwrap_or(&group.repository);
        lines.push(style(name).bold().to_string());
        lines.push(String::new());

        for entry in &group.commits {
            lines.push(format!("{}. {}", entry.number, entry.commit.title()));
            for item in body_items(&entry.commit.message) {
                lines.push(format!("   - {item}"));
            }
            lines.push(String::new());
        }
    }

    lines.join("\n")
}

pub fn render_json(
    result: &AggregationResult,
    window: &DateWindow,
    organizations: &[String],
    users: &[String],
) -> Result<String> {
    let output = TrackerOutput {
        version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        organizations: organizations.to_vec(),
        users: users.to_vec(),
        window: *window,
        groups: result.groups.clone(),
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

pub fn render_ndjson(result: &AggregationResult) -> Result<String> {
    let mut lines = Vec::with_capacity(result.commit_count());
    for group in &result.groups {
        for entry in &group.commits {
            lines.push(serde_json::to_string(entry)?);
        }
    }
    Ok(lines.join("\n"))
}

pub fn render_plan(plans: &[RepoPlan], window: &DateWindow) -> String {
    let mut lines = vec![
        format!(
            "{} {} to {}",
            style("Date window:").bold(),
            window.start(),
            window.end()
        ),
        String::new(),
    ];

    for plan in plans {
        let branches = if plan.branches.is_empty() {
            style("(no matching branches)").dim().to_string()
        } else {
            plan.branches.join(", ")
        };
        lines.push(format!(
            "{:<40} {:<28} {}",
            plan.repository,
            style(&plan.strategy).cyan(),
            branches
        ));
    }

    let queried = plans.iter().filter(|p| !p.branches.is_empty()).count();
    lines.push(String::new());
    lines.push(format!(
        "{} repositories, {} with branches to query",
        style(plans.len()).cyan(),
        style(queried).cyan()
    ));
    lines.join("\n")
}
