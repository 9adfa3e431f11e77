use crate::output;
use anyhow::Context;
use rerank_core::config::Config;
use rerank_core::context::{build_context, ContextTable};
use rerank_core::fields::FieldIds;
use rerank_core::jira::JiraClient;
use rerank_core::query::{children_query, find_children, find_top_ticket_per_tier};
use rerank_core::reorder::{Reorderer, RunMode};
use rerank_core::retry::RetryingTracker;
use rerank_core::types::Priority;
use std::path::PathBuf;

pub struct PrioritizeArgs {
    pub parent: String,
    pub project_id: String,
    pub token: String,
    pub url: String,
    pub issue_types: Vec<String>,
    pub config: Option<PathBuf>,
    pub dry_run: bool,
    pub with_context: bool,
}

fn load_config(args: &PrioritizeArgs) -> anyhow::Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if !args.issue_types.is_empty() {
        config.issue_types = args.issue_types.clone();
        config.validate()?;
    }
    Ok(config)
}

pub fn run(args: &PrioritizeArgs) -> anyhow::Result<()> {
    if args.token.trim().is_empty() {
        anyhow::bail!("a Jira token is required (--token or JIRA_TOKEN)");
    }
    let config = load_config(args)?;
    let mode = RunMode::from_dry_run(args.dry_run);
    tracing::info!(url = %args.url, parent = %args.parent, ?mode, "starting rerank");

    let client = JiraClient::new(&args.url, &args.token, config.timeout())
        .context("failed to build Jira client")?;
    let tracker = RetryingTracker::new(client, config.retry.policy());
    let base_ids = FieldIds::resolve(&tracker, &[]).context("failed to resolve Jira fields")?;

    let exclude = config
        .exclude_children_from_anchors
        .then_some(args.parent.as_str());

    for issue_type in &config.issue_types {
        println!("{}", output::section(issue_type));

        let query = children_query(&args.parent, &args.project_id, issue_type);
        println!("{}", output::query(&query));
        let children = find_children(
            &tracker,
            &args.parent,
            &args.project_id,
            issue_type,
            &base_ids,
        )?;
        println!("{}", output::results(&children.keys()));

        let mut anchors = find_top_ticket_per_tier(
            &tracker,
            Priority::all(),
            &args.project_id,
            issue_type,
            exclude,
            &base_ids,
        )?;

        let context = if args.with_context {
            let ids = base_ids.clone().with_sample(&children.tickets);
            build_context(&tracker, &children.tickets, &ids)
                .context("failed to look up ticket context")?
        } else {
            ContextTable::default()
        };

        let mut reorderer = Reorderer::new(&tracker, &mut anchors, &base_ids, mode);
        for child in &children.tickets {
            println!("{}", output::ticket_header(&child.key));
            if let Some(ctx) = context.get(&child.key) {
                output::print_lines(&output::context(ctx));
            }
            let step = reorderer
                .step(child)
                .with_context(|| format!("failed to rank {}", child.key))?;
            println!("{}", output::step(&step));
        }
    }

    println!("Done.");
    Ok(())
}
