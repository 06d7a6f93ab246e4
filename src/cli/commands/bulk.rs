use crate::api::client::WorkflowBackend;
use crate::api::errors::ApiError;
use crate::api::types::{BulkItemError, BulkUpdateResponse, WorkflowId};
use crate::bulk::{BulkActions, BulkError, BulkOutcome, Selection};
use crate::cli::commands::{
    confirm, load_graph, print_troubleshooting, resolve_actor, with_backend,
};
use crate::config::config;
use crate::observability::{api_metrics, OperationTimer};
use crate::telemetry::{create_workflow_span, generate_correlation_id};
use crate::workflows::{partition_bulk, Gate, WorkflowStatus};
use anyhow::Result;
use tracing::Instrument;

pub struct BulkCommand {
    pub status: String,
    pub ids: Vec<i64>,
    pub comment: Option<String>,
    pub dry_run: bool,
    pub yes: bool,
}

impl BulkCommand {
    pub async fn execute(&self) -> Result<()> {
        let status: WorkflowStatus = self.status.parse()?;
        let confirm_after = config()?.bulk.confirm_after_attempts;
        let graph = load_graph(None)?;
        let gate = Gate::new(&graph);
        let span = create_workflow_span("bulk_update", None, &generate_correlation_id());

        with_backend(|backend| {
            async move {
                if self.dry_run {
                    return self.preview(&backend, &gate, status).await;
                }
                let actions = BulkActions::new(backend).with_confirm_after(confirm_after);
                self.run(actions, status, confirm).await
            }
            .instrument(span)
        })
        .await
    }

    fn selected_ids(&self) -> Vec<WorkflowId> {
        self.ids.iter().copied().map(WorkflowId).collect()
    }

    /// Predict the partition locally with the same rules the backend applies
    pub async fn preview<B: WorkflowBackend + ?Sized>(
        &self,
        backend: &B,
        gate: &Gate<'_>,
        status: WorkflowStatus,
    ) -> Result<()> {
        let (_, actor) = resolve_actor(backend).await?;
        let items = backend.inbox().await?;
        let predicted = partition_bulk(
            gate,
            &items,
            &self.selected_ids(),
            actor,
            status,
            self.comment.as_deref(),
        );

        println!("🔍 DRY RUN: {} → {}", self.ids.len(), status);
        render_partition(&predicted);
        println!();
        println!("💡 Items outside your inbox show as 'not found'; the backend may accept them");
        Ok(())
    }

    /// Apply once, then keep offering to retry whatever failed until the user stops.
    /// `ask` answers y/N questions.
    pub async fn run<B, A>(
        &self,
        mut actions: BulkActions<B>,
        status: WorkflowStatus,
        mut ask: A,
    ) -> Result<()>
    where
        B: WorkflowBackend,
        A: FnMut(&str) -> Result<bool>,
    {
        let comment = self.comment.clone().unwrap_or_default();
        if status.demands_comment() && comment.is_empty() {
            println!("⚠️  No comment given: only workflows already '{status}' will succeed");
            println!("   → Pass --comment '...' to apply one to every selected workflow");
        }

        let mut selection: Selection = self.selected_ids().into_iter().collect();
        let timer = OperationTimer::new("bulk_update");

        println!("📦 Setting {} workflow(s) to {}...", selection.len(), status);
        match actions.apply(&mut selection, status, &comment).await {
            Ok(outcome) => render_outcome(outcome),
            Err(BulkError::Api(e)) => {
                report_failure(&e);
                if !matches!(e, ApiError::BulkRejected { .. }) {
                    return Err(e.into());
                }
                if let Some(outcome) = actions.last_outcome() {
                    render_outcome(outcome);
                }
            }
            Err(e) => return Err(e.into()),
        }

        loop {
            let (label, failed, confirmation) = match actions.last_outcome() {
                Some(outcome) if outcome.has_failures() => (
                    outcome.retry_label(),
                    outcome.errors.len(),
                    outcome.confirmation_prompt(),
                ),
                _ => break,
            };

            if !ask(&format!("🔁 {label} for {failed} item(s)?"))? {
                break;
            }

            let auto_confirm = self.yes;
            let mut prompt_error = None;
            let result = actions
                .retry_failed(|_| {
                    auto_confirm
                        || ask(&format!("⚠️  {confirmation}")).unwrap_or_else(|e| {
                            prompt_error = Some(e);
                            false
                        })
                })
                .await;
            if let Some(e) = prompt_error {
                return Err(e);
            }

            match result {
                Ok(Some(outcome)) => render_outcome(outcome),
                Ok(None) => {
                    println!("❌ Retry cancelled by user");
                    break;
                }
                Err(BulkError::Api(e)) => {
                    report_failure(&e);
                    if let Some(outcome) = actions.last_outcome() {
                        render_outcome(outcome);
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        timer.finish();
        api_metrics().log_stats();
        Ok(())
    }
}

fn report_failure(err: &ApiError) {
    println!("❌ {err}");
    print_troubleshooting(err);
}

fn render_errors(errors: &[BulkItemError]) {
    if errors.is_empty() {
        return;
    }
    println!("   Errors:");
    for error in errors {
        println!("     ❌ #{}: {}", error.id, error.error);
    }
}

fn render_partition(partition: &BulkUpdateResponse) {
    println!("   ✅ Would update: {}", partition.updated.len());
    render_errors(&partition.errors);
}

fn render_outcome(outcome: &BulkOutcome) {
    println!("   ✅ Updated: {}", outcome.updated.len());
    render_errors(&outcome.errors);
}
