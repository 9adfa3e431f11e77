mod cmd;
mod output;

use clap::Parser;
use rerank_core::jira::DEFAULT_URL;
use rerank_core::RerankError;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LONG_ABOUT: &str = "\
Prioritize every child of one parent above the rest of the backlog, tier by tier.

When parent links group tickets into categories and one category becomes the
focus, its tickets need to move up the backlog. Moving them all to the very
top would ignore their own priority, so instead each child is ranked above the
highest-ranked other ticket of the same priority: Blocker children above all
other Blocker tickets, Critical children above all other Critical tickets, and
so on. Children keep their relative order within a tier.";

#[derive(Parser)]
#[command(
    name = "rerank",
    about = "Rank a parent's children above same-priority tickets",
    long_about = LONG_ABOUT,
    version
)]
struct Cli {
    /// Do not update issues
    #[arg(long)]
    dry_run: bool,

    /// Parent we are prioritizing (e.g. OCPSTRAT-1234)
    #[arg(short = 'p', long)]
    parent: String,

    /// Project that we are prioritizing in
    #[arg(short = 'P', long)]
    project_id: String,

    /// Jira personal access token
    #[arg(short = 't', long, env = "JIRA_TOKEN", hide_env_values = true)]
    token: String,

    /// Jira URL
    #[arg(short = 'u', long, env = "JIRA_URL", default_value = DEFAULT_URL)]
    url: String,

    /// Issue type to process; repeat for several (default: from config, else Feature)
    #[arg(long = "issue-type", value_name = "TYPE")]
    issue_types: Vec<String>,

    /// YAML config file
    #[arg(long, env = "RERANK_CONFIG")]
    config: Option<PathBuf>,

    /// Show each child's parent and the tickets it blocks
    #[arg(long)]
    with_context: bool,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = cmd::prioritize::PrioritizeArgs {
        parent: cli.parent,
        project_id: cli.project_id,
        token: cli.token,
        url: cli.url,
        issue_types: cli.issue_types,
        config: cli.config,
        dry_run: cli.dry_run,
        with_context: cli.with_context,
    };

    if let Err(e) = cmd::prioritize::run(&args) {
        match e.downcast_ref::<RerankError>() {
            // An empty query is an operator problem, reported like the rest of the log.
            Some(no_results @ RerankError::NoResults { .. }) => println!("{no_results}"),
            _ => eprintln!("error: {e:#}"),
        }
        std::process::exit(1);
    }
}
