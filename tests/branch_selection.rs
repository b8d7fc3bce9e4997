use commit_tracker::{select, BranchPolicy, BranchStrategy};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

fn names(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn priority_picks_first_existing_branch() {
    let strategy = BranchStrategy::Priority(names(&["main", "master"]));
    assert_eq!(select(&strategy, &set(&["master", "develop"])), names(&["master"]));
}

#[test]
fn priority_prefers_earlier_name_when_both_exist() {
    let strategy = BranchStrategy::Priority(names(&["main", "master"]));
    assert_eq!(select(&strategy, &set(&["master", "main"])), names(&["main"]));
}

#[test]
fn priority_without_match_is_empty() {
    let strategy = BranchStrategy::Priority(names(&["main", "master"]));
    assert!(select(&strategy, &set(&["develop"])).is_empty());
}

#[test]
fn specific_keeps_configured_order_and_skips_missing() {
    let strategy = BranchStrategy::Specific(names(&["main", "x", "develop"]));
    assert_eq!(
        select(&strategy, &set(&["develop", "main"])),
        names(&["main", "develop"])
    );
}

#[test]
fn specific_ignores_repeated_names() {
    let strategy = BranchStrategy::Specific(names(&["main", "main"]));
    assert_eq!(select(&strategy, &set(&["main"])), names(&["main"]));
}

#[test]
fn all_returns_every_available_branch() {
    let selected = select(&BranchStrategy::All, &set(&["b", "a"]));
    assert_eq!(selected, names(&["a", "b"]));
}

#[test]
fn all_on_branchless_repository_is_empty() {
    assert!(select(&BranchStrategy::All, &BTreeSet::new()).is_empty());
}

#[test]
fn policy_override_applies_only_to_named_repository() {
    let policy = BranchPolicy::uniform(BranchStrategy::All).with_override(
        "acme/legacy",
        BranchStrategy::Priority(names(&["master"])),
    );
    assert_eq!(policy.for_repo("acme/api"), &BranchStrategy::All);
    assert_eq!(
        policy.for_repo("acme/legacy"),
        &BranchStrategy::Priority(names(&["master"]))
    );
}

#[test]
fn strategy_display_names_mode_and_branches() {
    assert_eq!(BranchStrategy::All.to_string(), "all");
    assert_eq!(
        BranchStrategy::Specific(names(&["main", "develop"])).to_string(),
        "specific [main, develop]"
    );
}
