pub mod client;

pub use client::{classify_status, next_link, retry_after, FailureKind, GitHubClient, RetryConfig, Target};

use crate::error::Result;
use crate::model::{CommitRecord, DateWindow};

/// Access to an organization's repositories.
///
/// Implemented over the GitHub REST API by [`GitHubClient`]; tests supply an
/// in-memory double. Failures must be `TransientFetch` for a single query
/// that can be skipped and `FatalFetch` for anything that invalidates the run.
pub trait RepoAccess {
    /// Full names (`org/repo`) of every repository in `organization`.
    fn list_repositories(&self, organization: &str) -> Result<Vec<String>>;

    fn list_branches(&self, repository: &str) -> Result<Vec<String>>;

    /// Commits on `branch` authored by `user` inside `window`.
    fn fetch_commits(
        &self,
        repository: &str,
        branch: &str,
        user: &str,
        window: &DateWindow,
    ) -> Result<Vec<CommitRecord>>;
}

impl<T: RepoAccess + ?Sized> RepoAccess for &T {
    fn list_repositories(&self, organization: &str) -> Result<Vec<String>> {
        (**self).list_repositories(organization)
    }

    fn list_branches(&self, repository: &str) -> Result<Vec<String>> {
        (**self).list_branches(repository)
    }

    fn fetch_commits(
        &self,
        repository: &str,
        branch: &str,
        user: &str,
        window: &DateWindow,
    ) -> Result<Vec<CommitRecord>> {
        (**self).fetch_commits(repository, branch, user, window)
    }
}
