mod common;

use commit_tracker::model::RepoPlan;
use commit_tracker::output::{body_items, clean_body_item, render_json, render_ndjson, render_plan, render_text};
use commit_tracker::{assemble, AggregationResult, DateWindow, PerRepoCommits};
use common::{at, commit, date};
use pretty_assertions::assert_eq;

fn sample() -> AggregationResult {
    let mut first = commit("acme/api", "main", "alice", "c1", at(2024, 1, 2, 9));
    first.message = "Add paging\n\n* feat(api): support cursors\nnot a bullet\n* fix(db): close pool\n".to_string();
    let second = commit("acme/api", "main", "alice", "c2", at(2024, 1, 3, 9));
    let other = commit("other/api", "main", "bob", "o1", at(2024, 1, 3, 9));
    let web = commit("acme/web", "main", "bob", "w1", at(2024, 1, 4, 9));

    let mut per_repo = PerRepoCommits::new();
    per_repo.insert("acme/api".to_string(), vec![first, second]);
    per_repo.insert("other/api".to_string(), vec![other]);
    per_repo.insert("acme/web".to_string(), vec![web]);
    assemble(
        per_repo,
        &["acme/api".to_string(), "other/api".to_string(), "acme/web".to_string()],
    )
}

#[test]
fn scope_prefix_and_bullet_are_stripped() {
    assert_eq!(clean_body_item("* feat(api): add paging"), "add paging");
    assert_eq!(clean_body_item("* plain item"), "plain item");
    assert_eq!(clean_body_item("*"), "");
}

#[test]
fn only_starred_body_lines_are_items() {
    let items = body_items("Title\n* feat(x): one\nprose\n  * two\n");
    assert_eq!(items, vec!["one", "two"]);
}

#[test]
fn text_lists_numbered_titles_with_body_items() {
    console::set_colors_enabled(false);
    let text = render_text(&sample());
    let lines: Vec<&str> = text.lines().collect();

    // short names collide for acme/api and other/api, so full names are shown
    assert_eq!(lines[0], "acme/api");
    assert_eq!(lines[2], "1. Add paging");
    assert_eq!(lines[3], "   - support cursors");
    assert_eq!(lines[4], "   - close pool");
    assert_eq!(lines[6], "2. commit c2");
    assert!(lines.contains(&"other/api"));
    assert!(lines.contains(&"web"));
}

#[test]
fn empty_text_output() {
    assert_eq!(render_text(&AggregationResult::default()), "No commits found.");
}

#[test]
fn json_carries_window_and_numbered_groups() {
    let window = DateWindow::new(date(2024, 1, 1), date(2024, 1, 31)).unwrap();
    let json = render_json(&sample(), &window, &["acme".to_string()], &["alice".to_string()]).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(v["version"], 1);
    assert_eq!(v["window"]["start"], "2024-01-01");
    assert_eq!(v["groups"].as_array().unwrap().len(), 3);
    assert_eq!(v["groups"][0]["commits"][1]["number"], 2);
    assert_eq!(v["groups"][0]["commits"][1]["sha"], "c2");
}

#[test]
fn ndjson_has_one_line_per_commit() {
    let out = render_ndjson(&sample()).unwrap();
    let lines: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[3]["repository"], "acme/web");
    assert_eq!(lines[3]["number"], 1);
}

#[test]
fn plan_mentions_every_repository() {
    console::set_colors_enabled(false);
    let window = DateWindow::new(date(2024, 1, 1), date(2024, 1, 2)).unwrap();
    let plans = vec![
        RepoPlan {
            repository: "acme/api".to_string(),
            strategy: "priority [main]".to_string(),
            branches: vec!["main".to_string()],
        },
        RepoPlan {
            repository: "acme/docs".to_string(),
            strategy: "priority [main]".to_string(),
            branches: Vec::new(),
        },
    ];
    let text = render_plan(&plans, &window);
    assert!(text.contains("2024-01-01 to 2024-01-02"));
    assert!(text.contains("acme/docs"));
    assert!(text.contains("(no matching branches)"));
    assert!(text.contains("2 repositories, 1 with branches to query"));
}
