use crate::api::client::WorkflowBackend;
use crate::api::types::{InboxStats, WorkflowItem};
use crate::cli::commands::{load_graph, print_troubleshooting, resolve_actor, with_backend};
use crate::workflows::{Actor, Gate, RowActions};
use anyhow::Result;
use tracing::warn;

pub struct InboxCommand;

impl InboxCommand {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self) -> Result<()> {
        let graph = load_graph(None)?;
        let gate = Gate::new(&graph);

        with_backend(|backend| async move {
            let (profile, actor) = resolve_actor(&backend).await?;
            println!("📥 Inbox for {} ({})", profile.display_name(), actor.role);

            match backend.stats().await {
                Ok(stats) => println!("{}", stats_line(&stats)),
                Err(e) => warn!("Could not load inbox stats: {}", e),
            }
            println!();

            match backend.inbox().await {
                Ok(items) => {
                    if items.is_empty() {
                        println!("📋 Nothing waiting on you");
                        return Ok(());
                    }
                    for line in render_rows(&gate, actor, &items) {
                        println!("{line}");
                    }
                    println!();
                    println!("💡 [Action*] needs a comment: pims update ID STATUS --comment '...'");
                    Ok(())
                }
                Err(e) => {
                    println!("❌ Failed to load inbox: {e}");
                    print_troubleshooting(&e);
                    Err(e.into())
                }
            }
        })
        .await
    }
}

impl Default for InboxCommand {
    fn default() -> Self {
        Self::new()
    }
}

fn stats_line(stats: &InboxStats) -> String {
    let show = |v: Option<i64>| v.map_or("-".to_string(), |n| n.to_string());
    format!(
        "   📊 inbox {} · pending {} · processed today {} · overdue {}",
        show(stats.inbox_count),
        show(stats.pending_count),
        show(stats.processed_today),
        show(stats.overdue_count)
    )
}

fn render_rows(gate: &Gate<'_>, actor: Actor, items: &[WorkflowItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| {
            let actions = RowActions::for_item(gate, actor, item);
            let buttons: Vec<String> = actions.iter().map(|a| a.to_string()).collect();
            format!(
                "  #{:<6} {:<28} {:<16} {:<12} {:<16} {}",
                item.id,
                item.display_name(),
                item.display_sender(),
                item.status,
                item.display_submitted_at(),
                buttons.join(" ")
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::Role;
    use serde_json::json;

    #[test]
    fn test_rows_show_action_availability() {
        let items: Vec<WorkflowItem> = serde_json::from_value(json!([
            {"workflow_id": 11, "title": "budget.pdf", "status": "pending", "receiver_id": 5},
            {"workflow_id": 12, "title": "old.pdf", "status": "archived", "receiver_id": 5}
        ]))
        .unwrap();

        let rows = render_rows(&Gate::standard(), Actor::new(5, Role::Hod), &items);
        assert!(rows[0].contains("[Approve]"));
        assert!(rows[0].contains("[Reject*]"));
        assert!(rows[1].contains("(approve)"));
        assert!(!rows[1].contains('['));
    }

    #[test]
    fn test_stats_line_tolerates_missing_counts() {
        let stats = InboxStats {
            inbox_count: Some(4),
            ..InboxStats::default()
        };
        let line = stats_line(&stats);
        assert!(line.contains("inbox 4"));
        assert!(line.contains("overdue -"));
    }
}
