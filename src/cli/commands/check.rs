use crate::cli::commands::load_graph;
use crate::workflows::{
    validate_transition, Actor, Decision, DenialReason, Gate, Role, TransitionRequest, UserId,
    WorkflowStatus,
};
use anyhow::{Context, Result};

/// Evaluates one transition with the local gate; never contacts the backend
pub struct CheckCommand {
    pub role: String,
    pub actor: i64,
    pub receiver: Option<i64>,
    pub from: String,
    pub to: String,
    pub comment: Option<String>,
    pub graph_path: Option<String>,
}

impl CheckCommand {
    pub async fn execute(&self) -> Result<()> {
        let role: Role = self.role.parse()?;
        let requested: WorkflowStatus = self
            .to
            .parse()
            .context("requested status must be one of the known workflow statuses")?;
        // An unrecognised current status is still evaluated: it simply has no moves
        let current: Option<WorkflowStatus> = self.from.parse().ok();
        if current.is_none() {
            println!("⚠️  Unknown current status '{}': only Admin may move it", self.from);
        }

        let graph = load_graph(self.graph_path.as_deref())?;
        let gate = Gate::new(&graph);
        let request = TransitionRequest {
            actor: Actor {
                id: UserId(self.actor),
                role,
            },
            receiver_id: self.receiver.map(UserId),
            current,
            requested,
            comment: self.comment.as_deref(),
        };

        let decision = gate.evaluate(&request);
        println!(
            "🔎 {} #{} : {} → {}",
            role, self.actor, self.from, requested
        );
        match (decision, validate_transition(&gate, &request)) {
            (Decision::Allowed, _) => println!("✅ Allowed"),
            (Decision::Denied(reason), Err(rejection)) => {
                println!("⛔ Denied ({reason})");
                println!("   → {} [HTTP {}]", rejection.message, rejection.http_status());
                if decision.needs_comment() {
                    println!("   💡 Pass --comment to supply one");
                }
                if let (DenialReason::NotAllowedTransition, Some(from)) = (reason, current) {
                    println!("   💡 {}", describe_moves(&gate, from));
                }
            }
            (Decision::Denied(reason), Ok(())) => println!("⛔ Denied ({reason})"),
        }
        Ok(())
    }
}

fn describe_moves(gate: &Gate<'_>, from: WorkflowStatus) -> String {
    let targets = gate.graph().allowed_from(from);
    if targets.is_empty() {
        return format!("'{from}' is terminal: only Admin may move it");
    }
    let targets: Vec<&str> = targets.iter().map(|t| t.as_str()).collect();
    format!("Allowed from '{from}': {}", targets.join(", "))
}
