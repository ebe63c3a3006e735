use anyhow::Result;
use std::path::PathBuf;

use crate::application::services::AddonService;
use crate::domain::value_objects::ExitClassification;
use crate::presentation::cli::display::Display;

/// Handler for the install command
pub struct InstallCommand {
    pub path: PathBuf,
    pub verbose: bool,
}

impl InstallCommand {
    pub fn new(path: PathBuf, verbose: bool) -> Self {
        Self { path, verbose }
    }

    pub async fn execute(&self, service: &AddonService, display: &Display) -> Result<()> {
        display.header(&format!("Installing dependencies in {}...", self.path.display()));

        let outcome = service
            .install(&self.path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to install dependencies: {}", e))?;

        if outcome.steps.is_empty() {
            display.detail("No package manifests found");
            return Ok(());
        }

        for step in &outcome.steps {
            let line = format!("{} {}", step.stage, step.directory.display());
            match step.classification {
                ExitClassification::Success if self.verbose => display.success(&line),
                ExitClassification::Success => {}
                ExitClassification::Warning => {
                    display.warning(&format!("{}: {}", line, step.result.diagnostic()))
                }
                ExitClassification::Error => {
                    display.failure(&format!("{}: {}", line, step.result.diagnostic()))
                }
            }
        }

        if outcome.has_errors() {
            return Err(anyhow::anyhow!(
                "Dependency installation failed in {} step(s)",
                outcome.errors().count()
            ));
        }

        display.success(&format!(
            "Dependencies ready in {} director(ies)",
            outcome.directories().len()
        ));
        Ok(())
    }
}
