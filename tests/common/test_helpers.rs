//! Test helper functions and utilities

use oa_addons::application::{AddonService, Collaborators};
use oa_addons::domain::entities::AddonConfig;
use oa_addons::infrastructure::control_script::ControlScriptRuntime;
use oa_addons::infrastructure::process::CommandRunner;
use oa_addons::infrastructure::remote::RepositoryMetadataApi;
use oa_addons::infrastructure::scm::VersionControl;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::mock_services::{
    CallHistory, StubCommandRunner, StubMetadataApi, StubScriptRuntime, StubVersionControl,
};

/// Builder for an `AddonService` wired to stubs
pub struct ServiceBuilder {
    pub config: AddonConfig,
    pub vcs: Arc<dyn VersionControl>,
    pub runtime: Arc<dyn ControlScriptRuntime>,
    pub metadata_api: Arc<dyn RepositoryMetadataApi>,
    pub runner: Arc<dyn CommandRunner>,
}

impl ServiceBuilder {
    /// All stubs share `history`; the dependency installer is off
    pub fn new(history: &CallHistory) -> Self {
        let mut config = AddonConfig::default();
        config.installer.enabled = false;

        Self {
            config,
            vcs: Arc::new(StubVersionControl::new(history.clone())),
            runtime: Arc::new(StubScriptRuntime::new(history.clone())),
            metadata_api: Arc::new(StubMetadataApi::with_repositories(0)),
            runner: Arc::new(StubCommandRunner::new(history.clone())),
        }
    }

    pub fn vcs(mut self, vcs: impl VersionControl + 'static) -> Self {
        self.vcs = Arc::new(vcs);
        self
    }

    pub fn runtime(mut self, runtime: Arc<dyn ControlScriptRuntime>) -> Self {
        self.runtime = runtime;
        self
    }

    pub fn metadata_api(mut self, api: Arc<dyn RepositoryMetadataApi>) -> Self {
        self.metadata_api = api;
        self
    }

    pub fn runner(mut self, runner: impl CommandRunner + 'static) -> Self {
        self.runner = Arc::new(runner);
        self
    }

    pub fn with_installer(mut self) -> Self {
        self.config.installer.enabled = true;
        self
    }

    pub fn organization(mut self, organization: &str) -> Self {
        self.config.github.organization = Some(organization.to_string());
        self
    }

    pub fn page_size(mut self, page_size: u32, max_pages: u32) -> Self {
        self.config.github.page_size = page_size;
        self.config.github.max_pages = max_pages;
        self
    }

    fn collaborators(&self) -> Collaborators {
        Collaborators {
            vcs: self.vcs.clone(),
            runtime: self.runtime.clone(),
            metadata_api: self.metadata_api.clone(),
            runner: self.runner.clone(),
        }
    }

    pub fn build(self, base_directory: &Path) -> AddonService {
        let collaborators = self.collaborators();
        AddonService::with_base_directory(self.config, collaborators, base_directory)
    }

    /// Resolve the base directory the way the CLI does
    pub async fn build_resolving_base(self) -> AddonService {
        let collaborators = self.collaborators();
        AddonService::new(self.config, collaborators).await
    }
}

/// Create `dir/package.json`, optionally declaring a build script
pub fn write_package_json(dir: &Path, with_build: bool) -> PathBuf {
    std::fs::create_dir_all(dir).expect("Failed to create package directory");
    let content = if with_build {
        r#"{ "name": "pkg", "scripts": { "build": "tsc" } }"#
    } else {
        r#"{ "name": "pkg" }"#
    };
    let path = dir.join("package.json");
    std::fs::write(&path, content).expect("Failed to write package.json");
    path
}

pub fn manifest_with_managers(names: &[&str]) -> String {
    let managers = names
        .iter()
        .map(|name| format!(r#"{{ "Name": "{}", "StartMode": "always", "Options": "" }}"#, name))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        r#"{{ "RepoName": "demo", "Version": "1.0.0", "Managers": [ {} ] }}"#,
        managers
    )
}
