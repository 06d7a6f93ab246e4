use crate::cli::commands::load_graph;
use crate::workflows::StatusGraph;
use anyhow::Result;

pub struct GraphCommand {
    pub graph_path: Option<String>,
}

impl GraphCommand {
    pub fn new(graph_path: Option<String>) -> Self {
        Self { graph_path }
    }

    pub async fn execute(&self) -> Result<()> {
        let graph = load_graph(self.graph_path.as_deref())?;
        println!("🗺️  Workflow status transitions:");
        println!();
        for line in render(&graph) {
            println!("{line}");
        }
        println!();
        println!("💡 Admins may set any status; rejected and escalated need a comment");
        Ok(())
    }
}

fn render(graph: &StatusGraph) -> Vec<String> {
    graph
        .edges()
        .map(|(status, targets)| {
            if targets.is_empty() {
                format!("   {:<13} (terminal)", status.as_str())
            } else {
                let targets: Vec<&str> = targets.iter().map(|t| t.as_str()).collect();
                format!("   {:<13} → {}", status.as_str(), targets.join(", "))
            }
        })
        .collect()
}
