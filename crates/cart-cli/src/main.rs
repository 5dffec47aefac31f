mod carts;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use cart_core::{
    DEMO_TOKEN_VALUE, Event, RunContext, Runner, aggregate, analyze_gestures, create_build_artifact,
    generate_signal, sweep,
};
use cart_store::{ActivityLog, CONFIG_FILE, CartConfig, MemorySource, ResolvedPaths, full_search};
use clap::{Parser, Subcommand};

const RUN_ACTION: &str = "autonomous_cart_run";

const DEMO_MEMORY: &str = "
    The cat walked through the forest.
    Water flowed in the river nearby.
    People gathered under the trees.
    ";

const RULE: &str = "============================================================";

#[derive(Parser)]
#[command(name = "carts", about = "Autonomous cart runner")]
struct Cli {
    /// Project root (defaults to CARTS_ROOT, then the current directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Config file (defaults to carts.toml under the root)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every cart, log the run and print the results
    Run {
        /// Search query for the memory cart
        query: Option<String>,
    },

    /// Search memory; with a query also scan tokens and the ledger
    Search {
        /// Text to search for
        query: Option<String>,
    },

    /// Generate a quantum-tuned signal for a hash and value
    Signal {
        /// Hash identifier
        hash: Option<String>,

        /// Token value in dollars
        value: Option<f64>,
    },

    /// Sweep frequencies across a value range
    Sweep {
        start: f64,
        end: f64,

        #[arg(long, default_value_t = 10)]
        steps: usize,
    },

    /// Value a demo gesture sequence and analyze it
    Track,

    /// Create a build artifact from demo memory text
    Build,

    /// Summarize the activity log
    Log {
        /// Number of recent entries to show
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

struct Project {
    config: CartConfig,
    paths: ResolvedPaths,
}

fn open_project(cli: &Cli) -> Result<Project> {
    let root = cart_store::resolve_root(cli.root.as_deref());
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| root.join(CONFIG_FILE));
    let config = CartConfig::load(&config_path)
        .with_context(|| format!("failed to load config {}", config_path.display()))?;
    let paths = config.resolve(&root);
    tracing::debug!("project root {}", root.display());
    Ok(Project { config, paths })
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Run { query } => cmd_run(&cli, query.as_deref()),
        Commands::Search { query } => cmd_search(&cli, query.as_deref()),
        Commands::Signal { hash, value } => cmd_signal(hash.as_deref(), *value),
        Commands::Sweep { start, end, steps } => cmd_sweep(*start, *end, *steps),
        Commands::Track => cmd_track(),
        Commands::Build => cmd_build(),
        Commands::Log { limit } => cmd_log(&cli, *limit),
    }
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn cmd_run(cli: &Cli, query: Option<&str>) -> Result<()> {
    let project = open_project(cli)?;
    let mut carts = carts::lineup(&project.config, &project.paths);
    let mut ctx = RunContext::new(
        query.map(str::to_string),
        project.config.run.token_hash.clone(),
        project.config.run.token_value,
    );

    println!("{RULE}");
    println!("🚀 CART RUNNER - Starting All Autonomous Carts");
    println!("{RULE}");

    let mut runner = Runner::new();
    tracing::info!("run {} started", runner.run_id());
    let summary = runner.run_all(&mut carts, &mut ctx).summary.clone();

    println!("\n{RULE}");
    println!(
        "✅ All Carts Completed: {}/{}",
        summary.completed, summary.total_carts
    );
    println!("{RULE}");

    let log = ActivityLog::open(&project.paths.activity_log);
    match runner.persist(&log, RUN_ACTION, serde_json::json!({})) {
        Ok(()) => println!(
            "\n💾 Activity logged to {}",
            project.paths.activity_log.display()
        ),
        Err(e) => {
            tracing::warn!("failed to persist run {}: {e}", runner.run_id());
            eprintln!("⚠️ Failed to log activity: {e}");
        }
    }

    let report = runner.into_report();
    println!("\n📊 Full Results:");
    print_json(&report)?;
    println!("\n📝 Suggested Commit Message:");
    println!("{}", report.commit_message());
    Ok(())
}

fn cmd_search(cli: &Cli, query: Option<&str>) -> Result<()> {
    let project = open_project(cli)?;
    let memory = MemorySource::open(&project.paths.memory);
    match query.filter(|q| !q.is_empty()) {
        Some(q) => print_json(&full_search(
            &memory,
            &project.paths.tokens,
            &project.paths.ledger,
            q,
        )),
        None => print_json(&memory.search(None)),
    }
}

fn cmd_signal(hash: Option<&str>, value: Option<f64>) -> Result<()> {
    let signal = match (hash, value) {
        (Some(hash), Some(value)) => generate_signal(hash, value),
        _ => generate_signal(&"0".repeat(64), DEMO_TOKEN_VALUE),
    };
    print_json(&signal)
}

fn cmd_sweep(start: f64, end: f64, steps: usize) -> Result<()> {
    print_json(&sweep(start, end, steps))
}

fn cmd_track() -> Result<()> {
    let mut events = carts::demo_events();
    events.push(Event::tap(300.0, 400.0, 0.6, Some(carts::DEMO_USER)));

    let token = aggregate(&events).context("failed to aggregate demo events")?;
    let analysis = analyze_gestures(&events).context("failed to analyze demo events")?;

    println!("Movement Token:");
    print_json(&token)?;
    println!("\nPattern Analysis:");
    print_json(&analysis)
}

fn cmd_build() -> Result<()> {
    let artifact = create_build_artifact(
        &format!("demo{}", "0".repeat(60)),
        DEMO_TOKEN_VALUE,
        DEMO_MEMORY,
    );
    print_json(&artifact)
}

fn cmd_log(cli: &Cli, limit: usize) -> Result<()> {
    let project = open_project(cli)?;
    let path: &Path = &project.paths.activity_log;
    let doc = ActivityLog::open(path)
        .load()
        .with_context(|| format!("failed to read activity log {}", path.display()))?;

    if doc.is_empty() {
        println!("(no activity logged at {})", path.display());
        return Ok(());
    }

    println!("log:        {}", path.display());
    println!("version:    {}", doc.version);
    println!("created:    {}", doc.created);
    println!("activities: {}", doc.len());
    for entry in doc.activities.iter().rev().take(limit) {
        println!(
            "{}  {}  {}  {}/{}",
            entry.timestamp,
            entry.action,
            entry.run_id,
            entry.summary.completed,
            entry.summary.total_carts
        );
    }
    Ok(())
}
