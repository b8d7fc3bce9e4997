use crate::collect::PerRepoCommits;
use crate::model::{AggregationResult, CommitRecord, NumberedCommit, RepoGroup};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Order of commits inside a repository group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitOrder {
    /// Merge order from collection, first-seen first.
    #[default]
    Collected,
    /// Oldest first by author timestamp; ties keep collection order.
    Chronological,
}

pub fn assemble(per_repo: PerRepoCommits, repo_order: &[String]) -> AggregationResult {
    assemble_with(per_repo, repo_order, CommitOrder::Collected)
}

/// Group commits by repository in `repo_order`, drop empty repositories and
/// number each group's commits from 1.
///
/// Repositories missing from `repo_order` are appended after it by name so
/// no collected commit is lost.
pub fn assemble_with(
    mut per_repo: PerRepoCommits,
    repo_order: &[String],
    order: CommitOrder,
) -> AggregationResult {
    let mut names: Vec<String> = Vec::with_capacity(per_repo.len());
    for name in repo_order {
        if per_repo.contains_key(name) && !names.contains(name) {
            names.push(name.clone());
        }
    }
    let mut leftovers: Vec<String> = per_repo
        .keys()
        .filter(|k| !names.contains(k))
        .cloned()
        .collect();
    leftovers.sort();
    names.extend(leftovers);

    let groups = names
        .into_iter()
        .filter_map(|name| {
            let commits = per_repo.remove(&name)?;
            if commits.is_empty() {
                return None;
            }
            Some(RepoGroup {
                repository: name,
                commits: number(commits, order),
            })
        })
        .collect();

    AggregationResult { groups }
}

fn number(mut commits: Vec<CommitRecord>, order: CommitOrder) -> Vec<NumberedCommit> {
    if order == CommitOrder::Chronological {
        commits.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    }
    commits
        .into_iter()
        .enumerate()
        .map(|(i, commit)| NumberedCommit { number: i + 1, commit })
        .collect()
}
