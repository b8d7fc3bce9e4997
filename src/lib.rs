pub mod assemble;
pub mod branch;
pub mod cli;
pub mod collect;
pub mod config;
pub mod error;
pub mod github;
pub mod model;
pub mod output;
pub mod run;
pub mod window;

pub use assemble::{assemble, assemble_with, CommitOrder};
pub use branch::{select, BranchPolicy, BranchStrategy};
pub use collect::{plan, Collector, PerRepoCommits};
pub use config::Config;
pub use error::{Result, TrackerError};
pub use github::{GitHubClient, RepoAccess};
pub use model::{AggregationResult, CommitRecord, DateWindow, NumberedCommit, RepoGroup, Repository};
pub use window::resolve;
