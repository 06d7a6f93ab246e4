use crate::api::client::{HttpWorkflowBackend, WorkflowBackend};
use crate::api::errors::ApiError;
use crate::api::types::Profile;
use crate::config::config;
use crate::workflows::{Actor, StatusGraph, UserId};
use anyhow::{Context, Result};
use std::io::Write;

pub mod bulk;
pub mod check;
pub mod graph;
pub mod inbox;
pub mod update;
pub mod whoami;

pub async fn with_backend<F, Fut, R>(f: F) -> Result<R>
where
    F: FnOnce(HttpWorkflowBackend) -> Fut,
    Fut: std::future::Future<Output = Result<R>>,
{
    print!("🔄 Connecting to workflow backend... ");
    std::io::stdout().flush()?;

    let settings = config()?;
    match HttpWorkflowBackend::from_config(&settings.backend) {
        Ok(backend) => {
            println!("✅");
            f(backend).await
        }
        Err(e) => {
            println!("❌ Failed to initialize backend client: {e}");
            print_troubleshooting(&e);
            Err(e.into())
        }
    }
}

/// Fetch the profile and turn it into the actor the gate reasons about
pub async fn resolve_actor<B: WorkflowBackend + ?Sized>(backend: &B) -> Result<(Profile, Actor)> {
    let profile = backend.profile().await?;
    let role = profile
        .role()
        .with_context(|| format!("profile for user {} carries an unusable role", profile.id))?;
    let actor = Actor {
        id: UserId(profile.id),
        role,
    };
    Ok((profile, actor))
}

/// Transition table from `--graph`, else `workflow.graph_path`, else the built-in one
pub fn load_graph(path_override: Option<&str>) -> Result<StatusGraph> {
    let configured = match path_override {
        Some(path) => Some(path.to_string()),
        None => config().ok().and_then(|c| c.workflow.graph_path.clone()),
    };

    match configured {
        Some(path) => StatusGraph::load(&path)
            .with_context(|| format!("failed to load transition table from {path}")),
        None => Ok(StatusGraph::standard()),
    }
}

pub fn print_troubleshooting(err: &ApiError) {
    println!();
    println!("🎯 TROUBLESHOOTING:");
    for hint in err.troubleshooting() {
        println!("   → {hint}");
    }
}

/// Ask for a line on stdin. `None` on EOF.
pub fn prompt_line(question: &str) -> Result<Option<String>> {
    print!("{question}");
    std::io::stdout().flush()?;

    let mut input = String::new();
    if std::io::stdin().read_line(&mut input)? == 0 {
        return Ok(None);
    }
    Ok(Some(input.trim_end_matches(['\r', '\n']).to_string()))
}

/// y/N question; anything but "y"/"yes" declines
pub fn confirm(question: &str) -> Result<bool> {
    let answer = prompt_line(&format!("{question} [y/N]: "))?;
    Ok(answer.is_some_and(|a| matches!(a.trim().to_lowercase().as_str(), "y" | "yes")))
}

pub async fn show_how_to_get_started() -> Result<()> {
    println!("📂 pims - document workflow client");
    println!();
    println!("Everyday commands:");
    println!("  📥 pims inbox                 # Workflows waiting on you");
    println!("  ✏️  pims update ID STATUS      # Change one workflow");
    println!("  📦 pims bulk STATUS ID...     # Change many, retry the failures");
    println!();
    println!("Offline helpers:");
    println!("  🔎 pims check --role HOD --actor 5 --receiver 5 --from pending --to approved");
    println!("  🗺️  pims graph                 # Show the transition table");
    println!();
    println!("💡 Set PIMS_ACCESS_TOKEN and backend.base_url (pims.toml) first");
    Ok(())
}
