//! transc - tokenize a source file with the standard token table
//!
//! Usage: transc [OPTIONS] <input>

use anyhow::Context;
use clap::Parser as ClapParser;
use std::fs;
use std::path::PathBuf;
use std::process;
use transc::{DiagnosticReporter, Pipeline, QuoteMatching};

#[derive(ClapParser, Debug)]
#[command(name = "transc")]
#[command(version)]
#[command(about = "Scanner and semantic analysis front end", long_about = None)]
struct Args {
    /// Input source file
    #[arg(required = true)]
    input: PathBuf,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Close string literals on their opening quote only
    #[arg(long)]
    match_quotes: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&args) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let source = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let filename = args.input.display().to_string();

    let mut reporter = DiagnosticReporter::new();
    let file_id = reporter.add_file(&filename, &source);

    let quotes = if args.match_quotes {
        QuoteMatching::Opening
    } else {
        QuoteMatching::PreferSingle
    };
    let pipeline = Pipeline::new().with_quote_matching(quotes);

    let tokens = match pipeline.scan(&source) {
        Ok(tokens) => tokens,
        Err(err) => {
            reporter.report_error(file_id, &err);
            anyhow::bail!("could not scan {filename}");
        }
    };

    if args.dump_tokens {
        eprintln!("=== Tokens ===");
        for token in &tokens {
            let kind = match pipeline.table().lexeme_of(token.kind) {
                Some(lexeme) => format!("'{lexeme}'"),
                None => token.kind.to_string(),
            };
            eprintln!("{:>5}..{:<5} {kind:<12} {}", token.span.start, token.span.end, token.value);
        }
        eprintln!("=== End Tokens ===\n");
    }

    log::info!("{filename}: {} tokens", tokens.len());
    if args.verbose {
        eprintln!("Scanned {} tokens from {}", tokens.len(), args.input.display());
    }

    Ok(())
}
