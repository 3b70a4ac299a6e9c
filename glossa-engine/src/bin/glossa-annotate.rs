/// Glossary Annotator - Runs the content filter over a file
///
/// Usage: glossa-annotate <terms.json> [content-file]
///
/// Reads a JSON array of terms, annotates the content file (or stdin) as a
/// regular post and prints the result. Configuration comes from the
/// `GLOSSA_*` environment variables; `RUST_LOG` controls logging on stderr.

use glossa_engine::{Glossary, GlossaryConfig, RenderView, Term};
use std::fs;
use std::io::{self, Read};
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: glossa-annotate <terms.json> [content-file]");
        eprintln!();
        eprintln!("Example:");
        eprintln!("  echo 'An RJ45 jack' | glossa-annotate terms.json");
        process::exit(1);
    }

    let terms_json = match fs::read_to_string(&args[1]) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Failed to read {}: {}", args[1], e);
            process::exit(1);
        }
    };
    let terms: Vec<Term> = match serde_json::from_str(&terms_json) {
        Ok(terms) => terms,
        Err(e) => {
            eprintln!("Invalid terms file {}: {}", args[1], e);
            process::exit(1);
        }
    };

    let content = match args.get(2) {
        Some(path) => fs::read_to_string(path).map_err(|e| format!("Failed to read {path}: {e}")),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map(|_| buf)
                .map_err(|e| format!("Failed to read stdin: {e}"))
        }
    };
    let content = match content {
        Ok(content) => content,
        Err(message) => {
            eprintln!("{message}");
            process::exit(1);
        }
    };

    let term_count = terms.len();
    let glossary = match Glossary::in_memory(GlossaryConfig::from_env(), terms) {
        Ok(glossary) => glossary,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            process::exit(1);
        }
    };
    tracing::info!(terms = term_count, "Glossary loaded");

    print!("{}", glossary.render(&content, RenderView::Post));
}
