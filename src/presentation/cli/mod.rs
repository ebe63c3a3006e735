pub mod commands;
pub mod display;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::env;
use std::path::PathBuf;
use std::process::exit;

use crate::application::services::{AddonService, Collaborators};
use crate::domain::entities::AddonConfig;
use crate::infrastructure::filesystem::ConfigStore;

use commands::{
    AttachManagersCommand, CloneCommand, InstallCommand, ListCommand, ListReposCommand,
    PullCommand, RegisterCommand, UnregisterCommand,
};
use display::Display;

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_HASH"),
    " ",
    env!("BUILD_DATE"),
    ")"
);

/// oa-addons - Clone, synchronize and register add-on sub-projects
#[derive(Parser)]
#[command(name = "oa-addons")]
#[command(about = "Clone, synchronize and register add-on sub-projects")]
#[command(version = VERSION)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Working directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<String>,

    /// Configuration file (defaults to oa-addons.yaml in the working directory)
    #[arg(long, global = true, env = "OA_ADDONS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory new repositories are cloned into
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    /// Token for the repository hosting API
    #[arg(long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Register sub-projects with the running project
    Register {
        /// Sub-project paths or names under the base directory
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Read managers and metadata from the add-on manifest
        #[arg(long)]
        from_manifest: bool,
    },

    /// Remove sub-projects from the running project
    Unregister {
        /// Sub-project paths or names under the base directory
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// List registered sub-projects
    List {
        /// Print the registered paths as JSON
        #[arg(long)]
        json: bool,
    },

    /// Fast-forward an existing working copy
    Pull {
        /// Working copy path or sub-project name
        path_or_name: String,
    },

    /// Clone a repository, or update it when already present
    #[command(name = "clone")]
    CloneRepository {
        /// Repository URL
        url: String,

        /// Target directory (absolute or relative to the working directory; an existing non-repository directory is used as a container)
        #[arg(short, long)]
        target: Option<String>,

        /// Branch to check out when cloning
        #[arg(short, long)]
        branch: Option<String>,

        /// Print the add-on manifest after synchronizing
        #[arg(long)]
        show_manifest: bool,
    },

    /// List repositories of an organization
    ListRepos {
        /// Organization (defaults to the configured one)
        organization: Option<String>,

        /// Print the raw JSON list
        #[arg(long)]
        json: bool,
    },

    /// Install and build JavaScript dependencies of an add-on
    Install {
        /// Add-on path or name under the base directory
        path: PathBuf,
    },

    /// Attach managers declared in the add-on manifest
    AttachManagers {
        /// Add-on path or name under the base directory
        path: PathBuf,

        /// Manager names (all declared managers when omitted)
        names: Vec<String>,
    },
}

/// CLI application runner
pub struct CliApp {
    cli: Cli,
}

impl CliApp {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub fn verbose(&self) -> bool {
        self.cli.verbose
    }

    pub async fn run(self) -> Result<()> {
        colored::control::set_override(!self.cli.no_color);

        if let Some(ref dir) = self.cli.directory {
            env::set_current_dir(dir)?;
        }

        match self.handle_command().await {
            Ok(_) => Ok(()),
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                exit(1);
            }
        }
    }

    async fn handle_command(&self) -> Result<()> {
        let service = self.build_service().await?;
        let display = Display::new(!self.cli.no_color);
        let verbose = self.cli.verbose;

        match &self.cli.command {
            Commands::Register {
                paths,
                from_manifest,
            } => {
                RegisterCommand::new(paths.clone(), *from_manifest, verbose)
                    .execute(&service, &display)
                    .await
            }
            Commands::Unregister { paths } => {
                UnregisterCommand::new(paths.clone())
                    .execute(&service, &display)
                    .await
            }
            Commands::List { json } => ListCommand::new(*json).execute(&service, &display).await,
            Commands::Pull { path_or_name } => {
                PullCommand::new(path_or_name.clone())
                    .execute(&service, &display)
                    .await
            }
            Commands::CloneRepository {
                url,
                target,
                branch,
                show_manifest,
            } => {
                CloneCommand::new(url.clone(), target.clone(), branch.clone(), *show_manifest)
                    .execute(&service, &display)
                    .await
            }
            Commands::ListRepos { organization, json } => {
                ListReposCommand::new(organization.clone(), *json)
                    .execute(&service, &display)
                    .await
            }
            Commands::Install { path } => {
                InstallCommand::new(path.clone(), verbose)
                    .execute(&service, &display)
                    .await
            }
            Commands::AttachManagers { path, names } => {
                AttachManagersCommand::new(path.clone(), names.clone(), verbose)
                    .execute(&service, &display)
                    .await
            }
        }
    }

    async fn build_service(&self) -> Result<AddonService> {
        let config = self.load_config()?;
        let collaborators = Collaborators::from_config(&config)?;
        Ok(AddonService::new(config, collaborators).await)
    }

    /// Load the configuration file and apply command-line overrides
    fn load_config(&self) -> Result<AddonConfig> {
        let current_dir = env::current_dir()?;
        let mut config = ConfigStore::new()
            .load_addon_config(self.cli.config.as_deref(), &current_dir)
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        if let Some(base_dir) = &self.cli.base_dir {
            config.repositories.base_directory = Some(current_dir.join(base_dir));
        }
        if let Some(token) = self.cli.github_token.as_ref().filter(|t| !t.trim().is_empty()) {
            config.github.token = Some(token.clone());
        }

        Ok(config)
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}
