use rerank_core::context::TicketContext;
use rerank_core::reorder::RankStep;
use rerank_core::types::Ticket;

pub fn section(issue_type: &str) -> String {
    format!("\n\n## Processing {issue_type}")
}

pub fn query(jql: &str) -> String {
    format!("  ? {jql}")
}

pub fn results(keys: &[&str]) -> String {
    format!("  = {} results: [{}]", keys.len(), keys.join(", "))
}

pub fn ticket_header(key: &str) -> String {
    format!("### {key}")
}

pub fn step(step: &RankStep) -> String {
    format!("  > Issue rank of {step}")
}

fn describe(ticket: &Ticket) -> String {
    match ticket.priority_name() {
        Some(priority) => format!("{} ({priority})", ticket.key),
        None => ticket.key.clone(),
    }
}

pub fn context(ctx: &TicketContext) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(parent) = &ctx.parent {
        lines.push(format!("    parent: {}", describe(parent)));
    }
    if !ctx.blocks.is_empty() {
        let blocks: Vec<String> = ctx.blocks.iter().map(describe).collect();
        lines.push(format!("    blocks: {}", blocks.join(", ")));
    }
    lines
}

pub fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{line}");
    }
}
