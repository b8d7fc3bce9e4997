// Tracker configuration, read from a YAML file (default `config.yaml`).
//
// `${VAR}` references anywhere in the file are replaced from the
// environment before parsing; unknown variables are left as written.

use crate::branch::{BranchPolicy, BranchStrategy};
use crate::error::{Result, TrackerError};
use crate::window::parse_date;
use regex::{Captures, Regex};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    github: RawGitHub,
    branch_strategy: Option<RawStrategy>,
    #[serde(default)]
    date_range: RawDateRange,
}

#[derive(Debug, Default, Deserialize)]
struct RawGitHub {
    token: Option<String>,
    #[serde(default)]
    organizations: Vec<String>,
    #[serde(default)]
    usernames: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawStrategy {
    mode: Option<String>,
    #[serde(default)]
    branches: Vec<String>,
    #[serde(default)]
    overrides: BTreeMap<String, RawStrategy>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDateRange {
    from: Option<String>,
    to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRangeConfig {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub token: String,
    pub organizations: Vec<String>,
    pub usernames: Vec<String>,
    pub branch_policy: BranchPolicy,
    pub date_range: DateRangeConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(TrackerError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Self::parse_with_env(content, |name| std::env::var(name).ok())
    }

    /// Parse and validate with an explicit environment lookup.
    pub fn parse_with_env<F>(content: &str, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = expand_env_vars(content, &env)?;
        if expanded.trim().is_empty() {
            return Err(TrackerError::Config("Empty configuration file".to_string()));
        }

        let raw: Option<RawConfig> = serde_yaml::from_str(&expanded)
            .map_err(|e| TrackerError::Config(format!("Invalid YAML format: {e}")))?;
        let raw = raw.ok_or_else(|| TrackerError::Config("Empty configuration file".to_string()))?;

        let token = raw
            .github
            .token
            .filter(|t| !t.trim().is_empty() && !is_unexpanded(t))
            .or_else(|| env(TOKEN_ENV_VAR).filter(|t| !t.trim().is_empty()))
            .ok_or_else(|| TrackerError::Config("GitHub token is required".to_string()))?;

        let organizations = dedup(non_blank(raw.github.organizations));
        if organizations.is_empty() {
            return Err(TrackerError::Config(
                "At least one organization must be specified".to_string(),
            ));
        }

        let usernames = dedup(non_blank(raw.github.usernames));
        if usernames.is_empty() {
            return Err(TrackerError::Config(
                "At least one username must be specified in usernames array".to_string(),
            ));
        }

        let raw_strategy = raw
            .branch_strategy
            .ok_or_else(|| TrackerError::Config("branch_strategy section is required".to_string()))?;
        let branch_policy = build_policy(raw_strategy)?;

        let date_range = DateRangeConfig {
            from: blank_to_none(raw.date_range.from),
            to: blank_to_none(raw.date_range.to),
        };
        for (field, value) in [("from", &date_range.from), ("to", &date_range.to)] {
            if let Some(v) = value {
                parse_date(v).map_err(|_| {
                    TrackerError::InvalidDate(format!(
                        "date_range.{field} '{v}' must use YYYY-MM-DD format"
                    ))
                })?;
            }
        }

        Ok(Config {
            token,
            organizations,
            usernames,
            branch_policy,
            date_range,
        })
    }
}

/// Replace `${VAR}` with `env(VAR)`, leaving unknown references untouched.
pub fn expand_env_vars<F>(content: &str, env: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let pattern = Regex::new(r"\$\{([^}]+)\}")
        .map_err(|e| TrackerError::Config(format!("Invalid substitution pattern: {e}")))?;
    Ok(pattern
        .replace_all(content, |caps: &Captures| {
            env(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned())
}

fn is_unexpanded(value: &str) -> bool {
    let v = value.trim();
    v.starts_with("${") && v.ends_with('}')
}

fn build_policy(raw: RawStrategy) -> Result<BranchPolicy> {
    let default = build_strategy(raw.mode.as_deref(), raw.branches, "branch_strategy")?;
    let mut policy = BranchPolicy::uniform(default);

    for (repo, repo_raw) in raw.overrides {
        if !repo.contains('/') {
            return Err(TrackerError::Config(format!(
                "Invalid repository name in overrides: '{repo}'. Must be in 'organization/repository' format"
            )));
        }
        let context = format!("branch_strategy.overrides['{repo}']");
        let strategy = build_strategy(repo_raw.mode.as_deref(), repo_raw.branches, &context)?;
        policy = policy.with_override(repo, strategy);
    }

    Ok(policy)
}

fn build_strategy(mode: Option<&str>, branches: Vec<String>, context: &str) -> Result<BranchStrategy> {
    let branches = non_blank(branches);
    let needs_branches = |mode: &str| {
        if branches.is_empty() {
            Err(TrackerError::Config(format!(
                "{context}.branches is required for mode '{mode}' and must be a list"
            )))
        } else {
            Ok(())
        }
    };

    match mode {
        Some("all") => Ok(BranchStrategy::All),
        Some("specific") => {
            needs_branches("specific")?;
            Ok(BranchStrategy::Specific(branches))
        }
        Some("priority") => {
            needs_branches("priority")?;
            Ok(BranchStrategy::Priority(branches))
        }
        other => Err(TrackerError::Config(format!(
            "{context}.mode must be one of: 'all', 'specific', 'priority' (got {})",
            other.map(|m| format!("'{m}'")).unwrap_or_else(|| "nothing".to_string())
        ))),
    }
}

fn non_blank(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn dedup(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for v in values {
        if !out.contains(&v) {
            out.push(v);
        }
    }
    out
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
