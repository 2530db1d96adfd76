//! wordlens CLI
//!
//! Interactive terminal explorer: neighbor table plus ASCII scatter plots.

use anyhow::Context;
use clap::Parser;
use std::io::{self, Write};
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};
use wordlens::options::{ExplorerOptions, ModelOptions};
use wordlens::render::{render_ascii_chart, render_text_table};
use wordlens::{load, Exploration, Explorer, Projection, ProjectionError, ProjectionKind};

/// wordlens CLI - Interactive Word Embedding Explorer
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Explore one word (with --top-n neighbors) and exit instead of prompting
    #[arg(short, long)]
    word: Option<String>,

    #[command(flatten)]
    model: ModelOptions,

    #[command(flatten)]
    explorer: ExplorerOptions,
}

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("wordlens=warn".parse()?))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let source = args.model.source();
    println!("Loading embeddings from {}...", source.resolve()?.display());
    let store = load(&source).context("failed to load embedding table")?;
    println!(
        "Loaded {} words of dimension {}.",
        store.len(),
        store.dimension()
    );

    let explorer = Explorer::new(Arc::new(store), args.explorer.config());
    let default_top_n = explorer.config().default_top_n;

    if let Some(word) = &args.word {
        let exploration = explorer.explore(word, default_top_n);
        print_exploration(&exploration);
        return Ok(());
    }

    println!("Type a word to explore, 'help' for usage, 'quit' to exit.\n");

    loop {
        print!("wordlens> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("quit") || input.eq_ignore_ascii_case("exit") {
            println!("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("help") {
            print_help(explorer.config().min_top_n, explorer.config().max_top_n);
            continue;
        }

        match parse_query(input, default_top_n) {
            Ok((word, top_n)) => print_exploration(&explorer.explore(word, top_n)),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    Ok(())
}

fn parse_query(input: &str, default_top_n: usize) -> anyhow::Result<(&str, usize)> {
    let parts: Vec<&str> = input.split_whitespace().collect();

    match parts.as_slice() {
        [word] => Ok((*word, default_top_n)),
        [word, n] => {
            let top_n = n
                .parse::<usize>()
                .with_context(|| format!("invalid neighbor count '{}'", n))?;
            Ok((*word, top_n))
        }
        _ => anyhow::bail!("Expected: <word> [top_n]. Type 'help' for usage."),
    }
}

fn print_exploration(exploration: &Exploration) {
    match exploration {
        Exploration::NotFound { word } => {
            println!("Sorry, the word '{}' is not in the vocabulary.", word);
        }
        Exploration::Found {
            word,
            top_n,
            neighbors,
            pca,
            tsne,
        } => {
            println!("\nTop {} similar words to '{}':\n", top_n, word);
            println!("{}", render_text_table(neighbors));
            println!("{}", projection_text(ProjectionKind::Pca, pca));
            println!("{}", projection_text(ProjectionKind::Tsne, tsne));
        }
    }
}

fn projection_text(kind: ProjectionKind, projection: &Result<Projection, ProjectionError>) -> String {
    let mut out = format!("{}\n", kind.subheading());
    match projection {
        Ok(projection) => {
            if let Some(note) = &projection.note {
                out.push_str(&format!("({})\n", note));
            }
            out.push_str(&render_ascii_chart(projection));
        }
        Err(e) => out.push_str(&format!("{} unavailable: {}\n", kind.subheading(), e)),
    }
    out
}

fn print_help(min_top_n: usize, max_top_n: usize) {
    println!(
        r#"
Usage:

  <word>            - Show the nearest neighbors of <word> with PCA and t-SNE plots
  <word> <top_n>    - Same, with {min}..={max} neighbors
  help              - Show this help
  quit / exit       - Leave the explorer
"#,
        min = min_top_n,
        max = max_top_n
    );
}
