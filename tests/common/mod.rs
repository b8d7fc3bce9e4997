#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use commit_tracker::{CommitRecord, DateWindow, RepoAccess, Result, TrackerError};
use std::cell::RefCell;
use std::collections::HashMap;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn commit(repo: &str, branch: &str, user: &str, sha: &str, ts: DateTime<Utc>) -> CommitRecord {
    CommitRecord {
        sha: sha.to_string(),
        author: user.to_string(),
        author_name: user.to_uppercase(),
        message: format!("commit {sha}"),
        timestamp: ts,
        repository: repo.to_string(),
        branch: branch.to_string(),
        url: None,
    }
}

#[derive(Clone, Copy)]
pub enum Failure {
    Transient,
    Fatal,
}

impl Failure {
    fn error(self, what: &str) -> TrackerError {
        match self {
            Failure::Transient => TrackerError::TransientFetch(what.to_string()),
            Failure::Fatal => TrackerError::FatalFetch(what.to_string()),
        }
    }
}

/// In-memory GitHub double that records every call it receives.
#[derive(Default)]
pub struct FakeAccess {
    repos: HashMap<String, Vec<String>>,
    branches: HashMap<String, Vec<String>>,
    commits: HashMap<(String, String, String), Vec<CommitRecord>>,
    org_failures: HashMap<String, Failure>,
    branch_failures: HashMap<String, Failure>,
    fetch_failures: HashMap<(String, String, String), Failure>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeAccess {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repo(mut self, org: &str, full_name: &str, branches: &[&str]) -> Self {
        self.repos
            .entry(org.to_string())
            .or_default()
            .push(full_name.to_string());
        self.branches.insert(
            full_name.to_string(),
            branches.iter().map(|b| b.to_string()).collect(),
        );
        self
    }

    pub fn commits(mut self, repo: &str, branch: &str, user: &str, records: Vec<CommitRecord>) -> Self {
        self.commits
            .insert((repo.to_string(), branch.to_string(), user.to_string()), records);
        self
    }

    pub fn failing_org(mut self, org: &str, failure: Failure) -> Self {
        self.org_failures.insert(org.to_string(), failure);
        self
    }

    pub fn failing_branches(mut self, repo: &str, failure: Failure) -> Self {
        self.branch_failures.insert(repo.to_string(), failure);
        self
    }

    pub fn failing_fetch(mut self, repo: &str, branch: &str, user: &str, failure: Failure) -> Self {
        self.fetch_failures
            .insert((repo.to_string(), branch.to_string(), user.to_string()), failure);
        self
    }

    pub fn fetch_calls(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with("fetch "))
            .cloned()
            .collect()
    }
}

impl RepoAccess for FakeAccess {
    fn list_repositories(&self, organization: &str) -> Result<Vec<String>> {
        self.calls.borrow_mut().push(format!("repos {organization}"));
        if let Some(f) = self.org_failures.get(organization) {
            return Err(f.error(organization));
        }
        Ok(self.repos.get(organization).cloned().unwrap_or_default())
    }

    fn list_branches(&self, repository: &str) -> Result<Vec<String>> {
        self.calls.borrow_mut().push(format!("branches {repository}"));
        if let Some(f) = self.branch_failures.get(repository) {
            return Err(f.error(repository));
        }
        Ok(self.branches.get(repository).cloned().unwrap_or_default())
    }

    fn fetch_commits(
        &self,
        repository: &str,
        branch: &str,
        user: &str,
        _window: &DateWindow,
    ) -> Result<Vec<CommitRecord>> {
        self.calls
            .borrow_mut()
            .push(format!("fetch {repository} {branch} {user}"));
        let key = (repository.to_string(), branch.to_string(), user.to_string());
        if let Some(f) = self.fetch_failures.get(&key) {
            return Err(f.error(&format!("{repository}:{branch}:{user}")));
        }
        Ok(self.commits.get(&key).cloned().unwrap_or_default())
    }
}
