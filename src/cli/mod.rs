use clap::{Parser, Subcommand};

pub mod commands;

#[derive(Parser)]
#[command(name = "pims")]
#[command(about = "Document workflow client for the PIMS tracking backend")]
#[command(long_about = "pims lists the workflows routed to you, checks whether a status change \
                       is permitted before sending it, and applies status changes to many \
                       workflows at once with retry of the ones that failed. \
                       Start with 'pims inbox'.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show who the backend thinks you are
    Whoami,
    /// List workflows routed to you with the actions available on each
    Inbox,
    /// Evaluate a status change offline without contacting the backend
    Check {
        /// Role of the acting user
        #[arg(long, help = "Actor role: Admin, HOD, Staff or Registry")]
        role: String,
        /// Id of the acting user
        #[arg(long, help = "Numeric id of the acting user")]
        actor: i64,
        /// Assigned receiver of the workflow
        #[arg(long, help = "Numeric id of the workflow's assigned receiver, if any")]
        receiver: Option<i64>,
        /// Current status of the workflow
        #[arg(long, help = "Current workflow status as reported by the backend")]
        from: String,
        /// Requested status
        #[arg(long, help = "Status to move the workflow to")]
        to: String,
        /// Comment accompanying the change
        #[arg(long, help = "Comment for the change (required for rejected/escalated)")]
        comment: Option<String>,
        /// Transition table to use instead of the configured one
        #[arg(long, help = "Path to a TOML transition table")]
        graph: Option<String>,
    },
    /// Print the status transition table
    Graph {
        /// Transition table to use instead of the configured one
        #[arg(long, help = "Path to a TOML transition table")]
        graph: Option<String>,
    },
    /// Change the status of one workflow
    Update {
        /// Workflow id
        id: i64,
        /// Requested status
        status: String,
        /// Comment accompanying the change
        #[arg(long, short = 'm', help = "Comment for the change; prompted for when required")]
        comment: Option<String>,
    },
    /// Apply one status change to many workflows, then offer to retry failures
    Bulk {
        /// Requested status
        status: String,
        /// Workflow ids
        #[arg(required = true)]
        ids: Vec<i64>,
        /// Comment accompanying the change
        #[arg(long, short = 'm', help = "Comment applied to every selected workflow")]
        comment: Option<String>,
        /// Show the predicted partition without sending anything
        #[arg(long, help = "Preview which workflows would update and which would fail")]
        dry_run: bool,
        /// Auto-confirm repeated retries
        #[arg(short = 'y', long, help = "Skip the confirmation asked after repeated retries")]
        yes: bool,
    },
}
