use crate::api::client::WorkflowBackend;
use crate::api::types::WorkflowId;
use crate::cli::commands::{
    load_graph, print_troubleshooting, prompt_line, resolve_actor, with_backend,
};
use crate::telemetry::{create_workflow_span, generate_correlation_id};
use crate::workflows::{validate_item, DenialReason, Gate, WorkflowStatus};
use anyhow::Result;
use tracing::{warn, Instrument};

pub struct UpdateCommand {
    pub id: i64,
    pub status: String,
    pub comment: Option<String>,
}

impl UpdateCommand {
    pub fn new(id: i64, status: String, comment: Option<String>) -> Self {
        Self { id, status, comment }
    }

    pub async fn execute(&self) -> Result<()> {
        let status: WorkflowStatus = self.status.parse()?;
        let graph = load_graph(None)?;
        let gate = Gate::new(&graph);
        let span = create_workflow_span("update", Some(self.id), &generate_correlation_id());

        with_backend(|backend| async move {
            self.run(&backend, &gate, status, prompt_line)
                .instrument(span)
                .await
        })
        .await
    }

    /// Pre-check against the fetched row, collect a comment if one is needed, then send.
    /// `prompt` returns `None` when the user gives up.
    pub async fn run<B, P>(
        &self,
        backend: &B,
        gate: &Gate<'_>,
        status: WorkflowStatus,
        mut prompt: P,
    ) -> Result<()>
    where
        B: WorkflowBackend + ?Sized,
        P: FnMut(&str) -> Result<Option<String>>,
    {
        let id = WorkflowId(self.id);
        let (_, actor) = resolve_actor(backend).await?;
        let items = backend.inbox().await?;
        let mut comment = self.comment.clone();

        match items.iter().find(|item| item.id == id) {
            Some(item) => loop {
                match validate_item(gate, item, actor, status, comment.as_deref()) {
                    Ok(()) => break,
                    Err(rejection) if rejection.reason == DenialReason::CommentRequired => {
                        println!("📝 {}", rejection.message);
                        match prompt("Comment: ")? {
                            Some(text) => comment = Some(text),
                            None => {
                                println!("❌ Update cancelled: no comment given");
                                return Ok(());
                            }
                        }
                    }
                    Err(rejection) => {
                        println!("⛔ Workflow #{}: {}", id, rejection.message);
                        return Err(rejection.into());
                    }
                }
            },
            None => {
                println!("⚠️  Workflow #{id} is not in your inbox; the backend will decide");
                while status.demands_comment() && comment.as_deref().unwrap_or("").is_empty() {
                    match prompt("Comment: ")? {
                        Some(text) => comment = Some(text),
                        None => {
                            println!("❌ Update cancelled: no comment given");
                            return Ok(());
                        }
                    }
                }
            }
        }

        let comment = comment.unwrap_or_default();
        match backend.update_status(id, status, &comment).await {
            Ok(()) => {
                println!("✅ Workflow #{} is now {}", id, status);
                // Local rows are snapshots; refresh instead of patching them
                match backend.inbox().await {
                    Ok(items) => println!("📥 {} workflow(s) remain in your inbox", items.len()),
                    Err(e) => warn!("Could not refresh inbox: {}", e),
                }
                Ok(())
            }
            Err(e) => {
                println!("❌ Failed to update workflow #{}: {}", id, e);
                print_troubleshooting(&e);
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::MockWorkflowBackend;
    use crate::api::types::{Profile, WorkflowItem};
    use serde_json::json;

    fn profile(id: i64, role: &str) -> Profile {
        Profile {
            id,
            username: Some("tester".to_string()),
            email: None,
            department_id: None,
            role: role.to_string(),
        }
    }

    fn inbox() -> Vec<WorkflowItem> {
        serde_json::from_value(json!([
            {"workflow_id": 10, "status": "pending", "receiver_id": 5}
        ]))
        .unwrap()
    }

    fn command(status: &str, comment: Option<&str>) -> UpdateCommand {
        UpdateCommand::new(10, status.to_string(), comment.map(str::to_string))
    }

    #[tokio::test]
    async fn test_forbidden_update_is_not_sent() {
        let mut backend = MockWorkflowBackend::new();
        backend
            .expect_profile()
            .returning(|| Ok(profile(7, "Staff")));
        backend.expect_inbox().times(1).returning(|| Ok(inbox()));
        backend.expect_update_status().never();

        let result = command("approved", None)
            .run(&backend, &Gate::standard(), WorkflowStatus::Approved, |_| {
                panic!("no prompt expected")
            })
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_missing_comment_is_prompted_for() {
        let mut backend = MockWorkflowBackend::new();
        backend.expect_profile().returning(|| Ok(profile(5, "HOD")));
        backend.expect_inbox().times(2).returning(|| Ok(inbox()));
        backend
            .expect_update_status()
            .withf(|id, status, comment| {
                *id == WorkflowId(10)
                    && *status == WorkflowStatus::Rejected
                    && comment.to_string() == "unsigned"
            })
            .times(1)
            .returning(|_, _, _| Ok(()));

        let mut answers = vec![Some("unsigned".to_string()), Some(String::new())];
        command("rejected", None)
            .run(&backend, &Gate::standard(), WorkflowStatus::Rejected, |_| {
                Ok(answers.pop().flatten())
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_closed_prompt_cancels_the_update() {
        let mut backend = MockWorkflowBackend::new();
        backend.expect_profile().returning(|| Ok(profile(5, "HOD")));
        backend.expect_inbox().times(1).returning(|| Ok(inbox()));
        backend.expect_update_status().never();

        command("escalated", None)
            .run(&backend, &Gate::standard(), WorkflowStatus::Escalated, |_| Ok(None))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_admin_updates_workflow_outside_inbox() {
        let mut backend = MockWorkflowBackend::new();
        backend.expect_profile().returning(|| Ok(profile(1, "Admin")));
        backend.expect_inbox().returning(|| Ok(Vec::new()));
        backend
            .expect_update_status()
            .withf(|id, status, _| *id == WorkflowId(10) && *status == WorkflowStatus::Archived)
            .times(1)
            .returning(|_, _, _| Ok(()));

        command("archived", None)
            .run(&backend, &Gate::standard(), WorkflowStatus::Archived, |_| {
                panic!("no prompt expected")
            })
            .await
            .unwrap();
    }
}
