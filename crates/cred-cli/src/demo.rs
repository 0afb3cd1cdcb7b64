//! The built-in example contribution graph.
//!
//! A single small repository with a handful of contributors, issues,
//! pull requests, comments and reactions, addressed with the GitHub
//! plugin's prefixes so the default weights apply.

use cred_graph::{AddressError, Graph, GraphError};
use cred_pagerank::plugins::github::{self, Reaction};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DemoError {
    #[error(transparent)]
    Address(#[from] AddressError),
    #[error(transparent)]
    Graph(#[from] GraphError),
}

const OWNER: &str = "acme";
const REPO: &str = "widgets";

/// Builds the example graph.
pub fn example_graph() -> Result<Graph, DemoError> {
    let repo = github::repo(OWNER, REPO)?;
    let alice = github::user("alice")?;
    let bob = github::user("bob")?;
    let carol = github::user("carol")?;
    let dependabot = github::bot("dependabot")?;

    let crash_report = github::issue(OWNER, REPO, 1)?;
    let crash_fix = github::pull(OWNER, REPO, 2)?;
    let bump = github::pull(OWNER, REPO, 3)?;
    let docs_request = github::issue(OWNER, REPO, 4)?;
    let repro = github::comment(OWNER, REPO, 1, "c1")?;
    let thanks = github::comment(OWNER, REPO, 2, "c2")?;
    let approval = github::review(OWNER, REPO, 2, "r1")?;

    let mut graph = Graph::new();
    for node in [
        &repo,
        &alice,
        &bob,
        &carol,
        &dependabot,
        &crash_report,
        &crash_fix,
        &bump,
        &docs_request,
        &repro,
        &thanks,
        &approval,
    ] {
        graph.add_node(node.clone());
    }

    let edges = [
        // authorship
        github::authors_edge(&alice, &crash_report)?,
        github::authors_edge(&bob, &crash_fix)?,
        github::authors_edge(&dependabot, &bump)?,
        github::authors_edge(&carol, &docs_request)?,
        github::authors_edge(&carol, &repro)?,
        github::authors_edge(&alice, &thanks)?,
        github::authors_edge(&alice, &approval)?,
        // containment
        github::has_parent_edge(&crash_report, &repo)?,
        github::has_parent_edge(&crash_fix, &repo)?,
        github::has_parent_edge(&bump, &repo)?,
        github::has_parent_edge(&docs_request, &repo)?,
        github::has_parent_edge(&repro, &crash_report)?,
        github::has_parent_edge(&thanks, &crash_fix)?,
        github::has_parent_edge(&approval, &crash_fix)?,
        // references
        github::references_edge(&crash_fix, &crash_report)?,
        github::references_edge(&thanks, &bob)?,
        github::references_edge(&docs_request, &crash_fix)?,
        // reactions
        github::reacts_edge(Reaction::Hooray, &carol, &crash_fix)?,
        github::reacts_edge(Reaction::Heart, &bob, &repro)?,
        github::reacts_edge(Reaction::ThumbsUp, &alice, &bump)?,
        github::reacts_edge(Reaction::Rocket, &carol, &approval)?,
    ];
    for edge in edges {
        graph.add_edge(edge)?;
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cred_pagerank::{PagerankGraph, PagerankOptions, Weights};

    #[test]
    fn test_example_graph_builds() {
        let graph = example_graph().unwrap();
        assert_eq!(graph.node_count(), 12);
        assert_eq!(graph.edge_count(), 21);
    }

    #[tokio::test]
    async fn test_example_graph_scores_sum_to_one() {
        let weights = Weights::from_declarations(&[github::declaration().unwrap()]);
        let mut pg = PagerankGraph::new(example_graph().unwrap(), weights.edge_evaluator()).unwrap();
        pg.run_pagerank(PagerankOptions::default()).await.unwrap();

        let total: f64 = pg.nodes().unwrap().map(|s| s.score).sum();
        assert!((total - 1.0).abs() < 1e-9, "total = {}", total);

        // The fix is authored, reviewed, referenced and celebrated.
        let fix = github::pull(OWNER, REPO, 2).unwrap();
        let bump = github::pull(OWNER, REPO, 3).unwrap();
        let fix_score = pg.node(&fix).unwrap().unwrap().score;
        let bump_score = pg.node(&bump).unwrap().unwrap().score;
        assert!(fix_score > bump_score);
    }
}
