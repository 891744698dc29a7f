use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use bugdag_core::{load_graph, save_graph, save_records, Dataset};
use graph::{locate, reduce, CommitDag, DotRenderer, GitAncestry, GraphBuilder};

#[derive(Parser)]
#[command(name = "bugdag")]
#[command(about = "Commit-history outcome graphs for bug datasets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the annotated graph for a bug and render its views
    Build {
        /// Bug dataset directory (commit_history.csv + commits/)
        #[arg(long)]
        dataset: PathBuf,
        /// Checkout of the project's git repository
        #[arg(long)]
        repo: PathBuf,
        /// Output directory for the results table, graph blob and DOT files
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Reuse a previously saved graph blob if one exists
        #[arg(long)]
        restore: bool,
    },
    /// Re-render the views of a saved graph
    Render {
        /// Saved graph blob
        #[arg(long)]
        graph: PathBuf,
        /// Output directory for DOT files
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Commit to reduce from (defaults to the newest commit)
        #[arg(long)]
        root: Option<String>,
    },
    /// Find where ancestry first changes outcome
    Locate {
        /// Saved graph blob
        #[arg(long)]
        graph: PathBuf,
        /// Commit to walk back from
        #[arg(long)]
        from: String,
    },
    /// Show graph statistics
    Stats {
        /// Saved graph blob
        #[arg(long)]
        graph: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            dataset,
            repo,
            out,
            restore,
        } => {
            fs::create_dir_all(&out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            let blob_path = out.join("graph.json");

            let dataset = Dataset::new(&dataset);
            let history = dataset.commit_history()?;
            let fix = history.first().context("commit history is empty")?.clone();

            let dag = if restore && blob_path.is_file() {
                load_graph(&blob_path)?
            } else {
                let results = dataset.results();
                let ancestry = GitAncestry::open(repo.to_str())?;
                let builder = GraphBuilder::new(&results, &ancestry);
                let (dag, records) = builder.build(&history)?;

                save_records(out.join("commit_history_results.csv"), &records)?;
                save_graph(&blob_path, &dag)?;
                dag
            };

            render_views(&dag, &fix.hash, &out)?;
            println!("Graph built: {} commit(s)", dag.len());
        }
        Commands::Render { graph, out, root } => {
            fs::create_dir_all(&out)
                .with_context(|| format!("Failed to create {}", out.display()))?;
            let dag = load_graph(&graph)?;
            let root = match root {
                Some(hash) => hash,
                None => dag
                    .first()
                    .map(|node| node.hash.clone())
                    .context("graph is empty")?,
            };
            render_views(&dag, &root, &out)?;
        }
        Commands::Locate { graph, from } => {
            let dag = load_graph(&graph)?;
            let divergence = locate(&dag, &from)?;
            match divergence.frontier {
                Some(frontier) => {
                    println!("Outcome changes at:");
                    for hash in frontier {
                        println!("  {}", hash);
                    }
                }
                None => println!("No outcome change in known ancestry"),
            }
            println!("Visited {} commit(s)", divergence.visited.len());
        }
        Commands::Stats { graph } => {
            let dag = load_graph(&graph)?;
            let stats = dag.stats();
            println!("Total commits:     {}", stats.total_commits);
            println!("Merge commits:     {}", stats.merge_commits);
            println!("Root commits:      {}", stats.root_commits);
            println!("Build errors:      {}", stats.build_errors);
            println!("Test build errors: {}", stats.test_build_errors);
            println!("Test failures:     {}", stats.test_failures);
            println!("Test successes:    {}", stats.test_successes);
        }
    }

    Ok(())
}

/// Render the full view and the reduction from `root` next to each other
fn render_views(dag: &CommitDag, root: &str, out: &Path) -> Result<()> {
    let reduced = reduce(dag, root)?;
    let renderer = DotRenderer::new("CommitGraph");

    let full_path = out.join("CommitGraph_Full.dot");
    fs::write(&full_path, renderer.render(dag))
        .with_context(|| format!("Failed to write {}", full_path.display()))?;

    let reduced_path = out.join("CommitGraph_Reduced.dot");
    fs::write(&reduced_path, renderer.render(&reduced))
        .with_context(|| format!("Failed to write {}", reduced_path.display()))?;

    Ok(())
}
