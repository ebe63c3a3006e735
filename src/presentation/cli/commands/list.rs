use anyhow::Result;
use colored::Colorize;

use crate::application::services::AddonService;
use crate::domain::entities::RemoteRepositorySummary;
use crate::presentation::cli::display::Display;

/// Handler for the list command
pub struct ListCommand {
    pub json: bool,
}

impl ListCommand {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub async fn execute(&self, service: &AddonService, display: &Display) -> Result<()> {
        if self.json {
            let paths = service
                .list_projects()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to list sub-projects: {}", e))?;
            println!("{}", serde_json::to_string_pretty(&paths)?);
            return Ok(());
        }

        let projects = service
            .list_registered()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to list sub-projects: {}", e))?;

        if projects.is_empty() {
            println!("{}", "No sub-projects registered".dimmed());
            return Ok(());
        }

        let rows = projects
            .iter()
            .map(|project| vec![project.name.clone(), project.path.display().to_string()])
            .collect::<Vec<_>>();
        display.print_table(&["NAME", "PATH"], &rows);
        Ok(())
    }
}

/// Handler for the list-repos command
pub struct ListReposCommand {
    pub organization: Option<String>,
    pub json: bool,
}

impl ListReposCommand {
    pub fn new(organization: Option<String>, json: bool) -> Self {
        Self { organization, json }
    }

    pub async fn execute(&self, service: &AddonService, display: &Display) -> Result<()> {
        let spinner = display.create_spinner("Fetching repository list");
        let result = service.list_repos(self.organization.as_deref()).await;
        spinner.finish_and_clear();

        let json = result.map_err(|e| anyhow::anyhow!("Failed to list repositories: {}", e))?;
        if self.json {
            println!("{}", json);
            return Ok(());
        }

        let repositories: Vec<RemoteRepositorySummary> = serde_json::from_str(&json)?;
        let rows = repositories
            .iter()
            .map(|repo| {
                vec![
                    repo.name.clone(),
                    repo.default_branch.clone(),
                    repo.visibility.clone(),
                    repo.clone_url.clone(),
                ]
            })
            .collect::<Vec<_>>();
        display.print_table(&["NAME", "BRANCH", "VISIBILITY", "CLONE URL"], &rows);
        println!("{} {} repositories", "::".blue().bold(), repositories.len());
        Ok(())
    }
}
