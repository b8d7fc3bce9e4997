use crate::branch::{select, BranchPolicy};
use crate::error::Result;
use crate::github::RepoAccess;
use crate::model::{CommitRecord, DateWindow, RepoPlan, Repository};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

pub type PerRepoCommits = HashMap<String, Vec<CommitRecord>>;

/// Drives the per-repository, per-branch, per-user queries against a
/// [`RepoAccess`] and merges the results.
pub struct Collector<A> {
    access: A,
    progress: ProgressBar,
}

impl<A: RepoAccess> Collector<A> {
    pub fn new(access: A) -> Self {
        Self {
            access,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_spinner(mut self) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        self.progress = pb;
        self
    }

    pub fn access(&self) -> &A {
        &self.access
    }

    pub fn finish(&self) {
        self.progress.finish_and_clear();
    }

    /// List every repository of each organization together with its branches.
    ///
    /// Repositories keep the order the organizations and the API return them
    /// in. A transient failure listing branches leaves that repository with
    /// no branches; fatal errors propagate.
    pub fn discover(&self, organizations: &[String]) -> Result<Vec<Repository>> {
        let mut repositories = Vec::new();

        for org in organizations {
            info!(organization = %org, "processing organization");
            self.progress.set_message(format!("Listing repositories in {org}..."));

            let names = match self.access.list_repositories(org) {
                Ok(names) => names,
                Err(e) if !e.is_fatal() => {
                    warn!(organization = %org, error = %e, "skipping organization");
                    continue;
                }
                Err(e) => {
                    self.progress.finish_and_clear();
                    return Err(e);
                }
            };

            for name in names {
                self.progress.set_message(format!("Listing branches of {name}..."));
                let branches = match self.access.list_branches(&name) {
                    Ok(branches) => branches,
                    Err(e) if !e.is_fatal() => {
                        warn!(repository = %name, error = %e, "could not list branches");
                        Vec::new()
                    }
                    Err(e) => {
                        self.progress.finish_and_clear();
                        return Err(e);
                    }
                };
                self.progress.tick();
                repositories.push(Repository::new(name, branches));
            }
        }

        Ok(repositories)
    }

    /// Fetch and merge commits for every repository.
    ///
    /// Within a repository, queries run in a fixed order (selected branches
    /// in selection order, then users in configured order) and the first
    /// record seen for a sha wins. Transient failures skip one
    /// (branch, user) pair; a fatal failure aborts the whole collection.
    pub fn collect(
        &self,
        repositories: &[Repository],
        policy: &BranchPolicy,
        window: &DateWindow,
        users: &[String],
    ) -> Result<PerRepoCommits> {
        let mut per_repo = PerRepoCommits::new();

        for repo in repositories {
            let strategy = policy.for_repo(&repo.name);
            let branches = select(strategy, &repo.available_branches);
            info!(repository = %repo.name, ?branches, "processing repository");

            let mut commits: Vec<CommitRecord> = Vec::new();
            let mut seen: HashSet<(String, String)> = HashSet::new();

            for branch in &branches {
                for user in users {
                    self.progress
                        .set_message(format!("{} [{branch}] commits by {user}", repo.short_name()));

                    let batch = match self.access.fetch_commits(&repo.name, branch, user, window) {
                        Ok(batch) => batch,
                        Err(e) if !e.is_fatal() => {
                            warn!(
                                repository = %repo.name,
                                branch = %branch,
                                user = %user,
                                error = %e,
                                "skipping failed query"
                            );
                            continue;
                        }
                        Err(e) => {
                            self.progress.finish_and_clear();
                            return Err(e);
                        }
                    };

                    debug!(repository = %repo.name, branch = %branch, user = %user, count = batch.len(), "fetched commits");
                    for record in batch {
                        if seen.insert((repo.name.clone(), record.sha.clone())) {
                            commits.push(record);
                            self.progress.inc(1);
                        }
                    }
                }
            }

            per_repo.insert(repo.name.clone(), commits);
        }

        self.progress.finish_and_clear();
        Ok(per_repo)
    }
}

/// Branch selection for every repository without touching any commits.
pub fn plan(repositories: &[Repository], policy: &BranchPolicy) -> Vec<RepoPlan> {
    repositories
        .iter()
        .map(|repo| {
            let strategy = policy.for_repo(&repo.name);
            RepoPlan {
                repository: repo.name.clone(),
                strategy: strategy.to_string(),
                branches: select(strategy, &repo.available_branches),
            }
        })
        .collect()
}

pub fn repo_order(repositories: &[Repository]) -> Vec<String> {
    repositories.iter().map(|r| r.name.clone()).collect()
}
