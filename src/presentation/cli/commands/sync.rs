use anyhow::Result;

use crate::application::services::AddonService;
use crate::domain::entities::RepositoryReference;
use crate::presentation::cli::display::Display;

/// Handler for the clone command
pub struct CloneCommand {
    pub url: String,
    pub target_directory: Option<String>,
    pub branch: Option<String>,
    pub show_manifest: bool,
}

impl CloneCommand {
    pub fn new(
        url: String,
        target_directory: Option<String>,
        branch: Option<String>,
        show_manifest: bool,
    ) -> Self {
        Self {
            url,
            target_directory,
            branch,
            show_manifest,
        }
    }

    pub async fn execute(&self, service: &AddonService, display: &Display) -> Result<()> {
        let mut reference = RepositoryReference::new(self.url.clone());
        if let Some(target) = &self.target_directory {
            reference = reference.with_target_directory(target.clone());
        }
        if let Some(branch) = &self.branch {
            reference = reference.with_branch(branch.clone());
        }

        let spinner = display.create_spinner(&format!("Synchronizing {}", self.url));
        let result = service.clone_repository(&reference).await;
        spinner.finish_and_clear();

        let result = result.map_err(|e| anyhow::anyhow!("Failed to synchronize repository: {}", e))?;

        let action = if result.sync.cloned { "Cloned" } else { "Updated" };
        display.success(&format!("{} {}", action, result.repository_path.display()));
        if result.sync.changed {
            display.detail(&format!(
                "{} file(s) changed, {} insertion(s), {} deletion(s)",
                result.sync.files_touched.len(),
                result.sync.insertions,
                result.sync.deletions
            ));
        }

        match (&result.manifest_content, self.show_manifest) {
            (Some(manifest), true) => println!("{}", manifest),
            (None, _) => display.warning("No add-on manifest found in the repository"),
            _ => {}
        }
        Ok(())
    }
}

/// Handler for the pull command
pub struct PullCommand {
    pub path_or_name: String,
}

impl PullCommand {
    pub fn new(path_or_name: String) -> Self {
        Self { path_or_name }
    }

    pub async fn execute(&self, service: &AddonService, display: &Display) -> Result<()> {
        let spinner = display.create_spinner(&format!("Pulling {}", self.path_or_name));
        let result = service.pull(&self.path_or_name).await;
        spinner.finish_and_clear();

        let changes = result.map_err(|e| anyhow::anyhow!("Failed to pull: {}", e))?;
        if changes == 0 {
            display.success(&format!("{} is up to date", self.path_or_name));
        } else {
            display.success(&format!("{}: {} file(s) changed", self.path_or_name, changes));
        }
        Ok(())
    }
}
