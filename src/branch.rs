use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "branches", rename_all = "lowercase")]
pub enum BranchStrategy {
    All,
    Specific(Vec<String>),
    Priority(Vec<String>),
}

impl BranchStrategy {
    pub fn mode(&self) -> &'static str {
        match self {
            BranchStrategy::All => "all",
            BranchStrategy::Specific(_) => "specific",
            BranchStrategy::Priority(_) => "priority",
        }
    }
}

impl fmt::Display for BranchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchStrategy::All => write!(f, "all"),
            BranchStrategy::Specific(names) | BranchStrategy::Priority(names) => {
                write!(f, "{} [{}]", self.mode(), names.join(", "))
            }
        }
    }
}

/// Decide which branches to query.
///
/// `All` returns every available branch in name order. `Specific` keeps the
/// configured names that exist, in configured order. `Priority` returns at
/// most the first configured name that exists. A missing branch is never an
/// error, only an empty or shorter selection.
pub fn select(strategy: &BranchStrategy, available: &BTreeSet<String>) -> Vec<String> {
    match strategy {
        BranchStrategy::All => available.iter().cloned().collect(),
        BranchStrategy::Specific(names) => {
            let mut seen = HashSet::new();
            names
                .iter()
                .filter(|name| available.contains(name.as_str()))
                .filter(|name| seen.insert(*name))
                .cloned()
                .collect()
        }
        BranchStrategy::Priority(names) => names
            .iter()
            .find(|name| available.contains(name.as_str()))
            .cloned()
            .into_iter()
            .collect(),
    }
}

/// Default strategy plus per-repository overrides keyed by full name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchPolicy {
    default: BranchStrategy,
    overrides: HashMap<String, BranchStrategy>,
}

impl BranchPolicy {
    pub fn uniform(strategy: BranchStrategy) -> Self {
        Self {
            default: strategy,
            overrides: HashMap::new(),
        }
    }

    pub fn with_override(mut self, repository: impl Into<String>, strategy: BranchStrategy) -> Self {
        self.overrides.insert(repository.into(), strategy);
        self
    }

    pub fn default_strategy(&self) -> &BranchStrategy {
        &self.default
    }

    pub fn overrides(&self) -> &HashMap<String, BranchStrategy> {
        &self.overrides
    }

    pub fn for_repo(&self, full_name: &str) -> &BranchStrategy {
        self.overrides.get(full_name).unwrap_or(&self.default)
    }
}

impl From<BranchStrategy> for BranchPolicy {
    fn from(strategy: BranchStrategy) -> Self {
        Self::uniform(strategy)
    }
}
