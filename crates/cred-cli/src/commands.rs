//! CLI command implementations.

use crate::demo;
use colored::Colorize;
use cred_pagerank::plugins::{github, PluginDeclaration};
use cred_pagerank::{
    scores_by_maximum, PagerankGraph, PagerankOptions, Weights, DEFAULT_MAX_CRED,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tracing::info;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Default weights of a declaration, with optional overrides from a file.
fn load_weights(declaration: &PluginDeclaration, overrides: Option<&Path>) -> Result<Weights> {
    let mut weights = Weights::from_declarations(std::slice::from_ref(declaration));
    if let Some(path) = overrides {
        let loaded = Weights::load(path)?;
        weights.merge_overrides(&loaded);
        info!("Applied weight overrides from {}", path.display());
    }
    Ok(weights)
}

/// Score the example graph and print the top nodes.
pub async fn demo(
    max_iterations: usize,
    threshold: f64,
    weights_path: Option<&Path>,
    limit: usize,
    json: bool,
) -> Result<()> {
    let declaration = github::declaration()?;
    let weights = load_weights(&declaration, weights_path)?;
    let graph = demo::example_graph()?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message("Running PageRank...");

    let mut pg = PagerankGraph::new(graph, weights.edge_evaluator())?;
    let options = PagerankOptions {
        max_iterations,
        convergence_threshold: threshold,
    };
    let report = pg.run_pagerank(options).await?;

    spinner.finish_and_clear();

    let top = pg.top_nodes(limit)?;
    let scores: Vec<f64> = top.iter().map(|scored| scored.score).collect();
    let cred = scores_by_maximum(&scores, DEFAULT_MAX_CRED);

    if json {
        let nodes: Vec<_> = top
            .iter()
            .zip(&cred)
            .map(|(scored, cred)| {
                serde_json::json!({
                    "address": scored.node,
                    "type": declaration.node_type(scored.node).map(|t| t.name.as_str()),
                    "score": scored.score,
                    "cred": cred,
                })
            })
            .collect();
        let output = serde_json::json!({
            "report": report,
            "nodes": nodes,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let converged = report.convergence_delta <= threshold;
    let mark = if converged { "✓".green() } else { "⚠".yellow() };
    println!(
        "{} {} after {} iterations (delta {:.2e})",
        mark,
        if converged { "Converged" } else { "Stopped" },
        report.n_iterations.to_string().cyan(),
        report.convergence_delta
    );
    println!(
        "  {} nodes, {} edges\n",
        pg.node_count()?.to_string().cyan(),
        pg.edge_count()?.to_string().cyan()
    );

    for (scored, cred) in top.iter().zip(&cred) {
        let node_type = declaration.node_type(scored.node);
        let kind = node_type.map(|t| t.name.as_str()).unwrap_or("Node");
        let skip = node_type.map(|t| t.prefix.len()).unwrap_or(0);
        let id = scored.node.parts()[skip..].join("/");
        println!(
            "  {:>8.1}  {:<20} {}",
            cred,
            kind.yellow(),
            id.cyan()
        );
    }

    Ok(())
}

/// Print the default weights, or write them to a file.
pub fn weights(output: Option<&Path>) -> Result<()> {
    let declaration = github::declaration()?;
    let weights = load_weights(&declaration, None)?;

    if let Some(path) = output {
        weights.save(path)?;
        println!("{} Wrote default weights to {}", "✓".green(), path.display());
        return Ok(());
    }

    println!("{} plugin\n", declaration.name.cyan().bold());
    println!("{}", "Node types".bold());
    for node_type in &declaration.node_types {
        println!(
            "  {:<22} {:>6}  {}",
            node_type.plural_name.yellow(),
            node_type.default_weight,
            node_type.description
        );
    }

    println!("\n{}", "Edge types".bold());
    for edge_type in &declaration.edge_types {
        println!(
            "  {:<22} {:>6}  / {:<26} {:>8}",
            edge_type.forward_name.yellow(),
            edge_type.default_forward_weight,
            edge_type.backward_name.yellow(),
            edge_type.default_backward_weight
        );
    }

    Ok(())
}
