use crate::error::{Result, TrackerError};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const SCHEMA_VERSION: u32 = 1;

/// Inclusive calendar range `[start, end]` used to filter commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WindowBounds")]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct WindowBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<WindowBounds> for DateWindow {
    type Error = TrackerError;

    fn try_from(bounds: WindowBounds) -> Result<Self> {
        Self::new(bounds.start, bounds.end)
    }
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(TrackerError::InvalidDate(format!(
                "Invalid range: from ({start}) is after to ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// First instant of the window, midnight UTC on `start`.
    pub fn since(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// Last instant of the window, one second before midnight after `end`.
    pub fn until(&self) -> DateTime<Utc> {
        self.end.and_time(NaiveTime::MIN).and_utc() + Duration::days(1) - Duration::seconds(1)
    }

    pub fn contains(&self, timestamp: &DateTime<Utc>) -> bool {
        *timestamp >= self.since() && *timestamp <= self.until()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Full name, `organization/repository`.
    pub name: String,
    pub available_branches: BTreeSet<String>,
}

impl Repository {
    pub fn new<I, S>(name: impl Into<String>, branches: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            available_branches: branches.into_iter().map(Into::into).collect(),
        }
    }

    pub fn short_name(&self) -> &str {
        short_name(&self.name)
    }
}

pub fn short_name(full_name: &str) -> &str {
    full_name.rsplit('/').next().unwrap_or(full_name)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub sha: String,
    /// GitHub login of the author.
    pub author: String,
    pub author_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub repository: String,
    pub branch: String,
    pub url: Option<String>,
}

impl CommitRecord {
    pub fn title(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberedCommit {
    /// 1-based position within its repository group.
    pub number: usize,
    #[serde(flatten)]
    pub commit: CommitRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoGroup {
    pub repository: String,
    pub commits: Vec<NumberedCommit>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationResult {
    pub groups: Vec<RepoGroup>,
}

impl AggregationResult {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn commit_count(&self) -> usize {
        self.groups.iter().map(|g| g.commits.len()).sum()
    }
}

/// Branch plan for one repository, produced without fetching any commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoPlan {
    pub repository: String,
    pub strategy: String,
    pub branches: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerOutput {
    pub version: u32,
    pub generated_at: DateTime<Utc>,
    pub organizations: Vec<String>,
    pub users: Vec<String>,
    pub window: DateWindow,
    pub groups: Vec<RepoGroup>,
}
