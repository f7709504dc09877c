// ABOUTME: CLI binary for pricelens: searches every configured marketplace for one term.
// ABOUTME: Prints a summary, or stores the unified product records as JSON / JSON lines.

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use pricelens_scrape::options::DEFAULT_MAX_RESULTS;
use pricelens_scrape::{
    load_builtin_registry, load_registry_from_path, Aggregator, CanonicalProduct, JsonLinesSink,
    JsonSink, RuleRegistry, Sink, SourceOutcome,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pricelens")]
#[command(about = "Search marketplaces and print unified product listings")]
struct Args {
    /// Search term; prompted for on stdin when omitted
    #[arg()]
    term: Vec<String>,

    /// Print the products as a JSON array
    #[arg(long = "json")]
    json_output: bool,

    /// Print the products as JSON lines
    #[arg(long = "jsonl", conflicts_with = "json_output")]
    jsonl_output: bool,

    /// Write the products to a file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Products taken from each marketplace
    #[arg(short = 'n', long = "max-results", default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: usize,

    /// HTTP timeout in seconds
    #[arg(long = "timeout", default_value_t = 30)]
    timeout: u64,

    /// JSON file with marketplace rule sets (default: builtin rules)
    #[arg(long = "rules")]
    rules: Option<PathBuf>,

    /// Only search these platforms (repeatable)
    #[arg(short = 'p', long = "platform")]
    platforms: Vec<String>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Takes the term from the positional words, or prompts for it.
fn read_term(words: &[String]) -> Result<String> {
    let joined = words.join(" ");
    if !joined.trim().is_empty() {
        return Ok(joined.trim().to_string());
    }

    eprint!("Enter a search term: ");
    io::stderr().flush().ok();
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read search term")?;
    let term = line.trim();
    if term.is_empty() {
        bail!("search term must not be empty");
    }
    Ok(term.to_string())
}

fn load_rules(args: &Args) -> Result<RuleRegistry> {
    let mut registry = match &args.rules {
        Some(path) => load_registry_from_path(path)?,
        None => load_builtin_registry(),
    };
    if !args.platforms.is_empty() {
        registry.retain_platforms(args.platforms.as_slice());
        if registry.is_empty() {
            bail!("no rule set matches platform(s): {}", args.platforms.join(", "));
        }
    }
    Ok(registry)
}

fn store(products: &[CanonicalProduct], writer: impl Write, jsonl: bool) -> Result<()> {
    if jsonl {
        JsonLinesSink::new(writer).store(products)?;
    } else {
        JsonSink::new(writer).store(products)?;
    }
    Ok(())
}

fn write_output(products: &[CanonicalProduct], args: &Args, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot create {:?}", path))?;
    store(products, BufWriter::new(file), args.jsonl_output)
}

fn print_summary(term: &str, products: &[CanonicalProduct]) {
    println!("Found {} products for \"{}\":", products.len(), term);
    for p in products {
        println!(
            "[{}] {} | {} | {}",
            p.platform,
            p.product_name.as_deref().unwrap_or("-"),
            p.price.selling_price.as_deref().unwrap_or("-"),
            p.url.as_deref().unwrap_or("-"),
        );
    }
}

async fn run(args: Args) -> Result<bool> {
    let term = read_term(&args.term)?;
    let registry = load_rules(&args)?;
    tracing::info!(term = %term, sources = registry.len(), "searching");

    let aggregator = Aggregator::builder()
        .registry(registry)
        .max_results(args.max_results)
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    let report = aggregator.aggregate_with_report(&term).await;

    for source in &report.sources {
        match &source.outcome {
            SourceOutcome::Ok { .. } => {}
            SourceOutcome::Failed { message, .. } => {
                eprintln!("warning: {} failed: {}", source.platform, message);
            }
            SourceOutcome::TimedOut => {
                eprintln!("warning: {} timed out", source.platform);
            }
        }
    }

    let json_to_stdout = args.output.is_none() && (args.json_output || args.jsonl_output);

    if report.products.is_empty() {
        if json_to_stdout {
            store(&report.products, io::stdout().lock(), args.jsonl_output)?;
            eprintln!("No products found.");
        } else {
            println!("No products found.");
        }
        return Ok(false);
    }

    if let Some(path) = &args.output {
        write_output(&report.products, &args, path)?;
        println!("Saved {} products to {}", report.products.len(), path.display());
    } else if json_to_stdout {
        store(&report.products, io::stdout().lock(), args.jsonl_output)?;
    } else {
        print_summary(&term, &report.products);
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(1)
        }
    }
}
