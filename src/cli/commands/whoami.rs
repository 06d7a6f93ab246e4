use crate::cli::commands::{print_troubleshooting, with_backend};
use crate::api::client::WorkflowBackend;
use anyhow::Result;

pub struct WhoamiCommand;

impl WhoamiCommand {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self) -> Result<()> {
        with_backend(|backend| async move {
            match backend.profile().await {
                Ok(profile) => {
                    println!();
                    println!("👤 {} (user #{})", profile.display_name(), profile.id);
                    match profile.role() {
                        Ok(role) => println!("   🏷️  Role: {role}"),
                        Err(e) => println!("   ⚠️  Role: {} ({e})", profile.role),
                    }
                    if let Some(email) = &profile.email {
                        println!("   📧 Email: {email}");
                    }
                    if let Some(department) = profile.department_id {
                        println!("   🏢 Department: #{department}");
                    }
                    Ok(())
                }
                Err(e) => {
                    println!("❌ Failed to fetch profile: {e}");
                    print_troubleshooting(&e);
                    Err(e.into())
                }
            }
        })
        .await
    }
}

impl Default for WhoamiCommand {
    fn default() -> Self {
        Self::new()
    }
}
