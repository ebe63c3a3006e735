use anyhow::Result;
use std::path::PathBuf;

use crate::application::services::{AddonService, ConfigSource};
use crate::application::use_cases::RegistrationOutcome;
use crate::presentation::cli::display::Display;

/// Handler for the register command
pub struct RegisterCommand {
    pub paths: Vec<PathBuf>,
    pub from_manifest: bool,
    pub verbose: bool,
}

impl RegisterCommand {
    pub fn new(paths: Vec<PathBuf>, from_manifest: bool, verbose: bool) -> Self {
        Self {
            paths,
            from_manifest,
            verbose,
        }
    }

    pub async fn execute(&self, service: &AddonService, display: &Display) -> Result<()> {
        let source = if self.from_manifest {
            ConfigSource::Manifest
        } else {
            ConfigSource::Placeholder
        };

        display.header(&format!("Registering {} sub-project(s)...", self.paths.len()));

        let batch = service.register(&self.paths, source).await;

        let mut partial = 0;
        for outcome in &batch.completed {
            if !report_outcome(outcome, display, self.verbose) {
                partial += 1;
            }
        }

        if let Some((path, error)) = batch.failure {
            report_skipped(&batch.skipped, display);
            return Err(anyhow::anyhow!(
                "Failed to register {}: {}",
                path.display(),
                error
            ));
        }

        if partial > 0 {
            return Err(anyhow::anyhow!(
                "{} sub-project(s) registered with managers missing; retry with attach-managers",
                partial
            ));
        }
        Ok(())
    }
}

/// Handler for the attach-managers command
pub struct AttachManagersCommand {
    pub path: PathBuf,
    pub names: Vec<String>,
    pub verbose: bool,
}

impl AttachManagersCommand {
    pub fn new(path: PathBuf, names: Vec<String>, verbose: bool) -> Self {
        Self { path, names, verbose }
    }

    pub async fn execute(&self, service: &AddonService, display: &Display) -> Result<()> {
        display.header(&format!("Attaching managers to {}...", self.path.display()));

        let outcome = service
            .attach_managers(&self.path, &self.names)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to attach managers: {}", e))?;

        if report_outcome(&outcome, display, self.verbose) {
            Ok(())
        } else {
            Err(anyhow::anyhow!(
                "Managers not attached: {}",
                outcome.failed_managers().join(", ")
            ))
        }
    }
}

/// Handler for the unregister command
pub struct UnregisterCommand {
    pub paths: Vec<PathBuf>,
}

impl UnregisterCommand {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    pub async fn execute(&self, service: &AddonService, display: &Display) -> Result<()> {
        let batch = service.unregister(&self.paths).await;

        for path in &batch.completed {
            display.success(&format!("Unregistered {}", path.display()));
        }

        match batch.failure {
            Some((path, error)) => {
                report_skipped(&batch.skipped, display);
                Err(anyhow::anyhow!(
                    "Failed to unregister {}: {}",
                    path.display(),
                    error
                ))
            }
            None => Ok(()),
        }
    }
}

fn report_skipped(skipped: &[PathBuf], display: &Display) {
    for path in skipped {
        display.warning(&format!("Skipped {}", path.display()));
    }
}

/// Prints one outcome; returns whether every manager was attached
fn report_outcome(outcome: &RegistrationOutcome, display: &Display, verbose: bool) -> bool {
    if verbose {
        for step in &outcome.install.steps {
            display.detail(&format!(
                "{} {} ({:?})",
                step.stage,
                step.directory.display(),
                step.classification
            ));
        }
    }
    for step in outcome.install.warnings() {
        display.warning(&format!(
            "{} in {} finished with warnings: {}",
            step.stage,
            step.directory.display(),
            step.result.diagnostic()
        ));
    }

    for manager in &outcome.managers {
        match &manager.error {
            None if verbose => display.detail(&format!("Manager {} attached", manager.name)),
            None => {}
            Some(error) => display.failure(&format!("Manager {}: {}", manager.name, error)),
        }
    }

    if outcome.is_complete() {
        if outcome.registered {
            display.success(&format!("Registered {}", outcome.path.display()));
        } else {
            display.success(&format!("Managers attached for {}", outcome.path.display()));
        }
        true
    } else {
        display.warning(&format!(
            "{} is missing managers: {}",
            outcome.path.display(),
            outcome.failed_managers().join(", ")
        ));
        false
    }
}
