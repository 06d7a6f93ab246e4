use anyhow::Result;
use clap::Parser;
use pims_workflow::cli::commands::{
    bulk::BulkCommand, check::CheckCommand, graph::GraphCommand, inbox::InboxCommand,
    show_how_to_get_started, update::UpdateCommand, whoami::WhoamiCommand,
};
use pims_workflow::cli::{Cli, Commands};
use pims_workflow::config::{config, init_config, PimsConfig};
use pims_workflow::telemetry::{init_telemetry, shutdown_telemetry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Offline commands must keep working when the config file is broken
    let observability = config()
        .map(|c| c.observability.clone())
        .unwrap_or_else(|_| PimsConfig::default().observability);
    if let Err(e) = init_telemetry(&observability) {
        eprintln!("Warning: Failed to initialize telemetry: {e}");
    }

    let result = tokio::runtime::Runtime::new()?.block_on(run(cli.command));

    shutdown_telemetry();
    result
}

async fn run(command: Option<Commands>) -> Result<()> {
    match command {
        None => show_how_to_get_started().await,
        Some(Commands::Check {
            role,
            actor,
            receiver,
            from,
            to,
            comment,
            graph,
        }) => {
            CheckCommand {
                role,
                actor,
                receiver,
                from,
                to,
                comment,
                graph_path: graph,
            }
            .execute()
            .await
        }
        Some(Commands::Graph { graph }) => GraphCommand::new(graph).execute().await,
        Some(Commands::Whoami) => {
            init_config()?;
            WhoamiCommand::new().execute().await
        }
        Some(Commands::Inbox) => {
            init_config()?;
            InboxCommand::new().execute().await
        }
        Some(Commands::Update {
            id,
            status,
            comment,
        }) => {
            init_config()?;
            UpdateCommand::new(id, status, comment).execute().await
        }
        Some(Commands::Bulk {
            status,
            ids,
            comment,
            dry_run,
            yes,
        }) => {
            init_config()?;
            BulkCommand {
                status,
                ids,
                comment,
                dry_run,
                yes,
            }
            .execute()
            .await
        }
    }
}
