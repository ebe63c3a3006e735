//! # oa-addons - Add-on sub-project manager
//!
//! `oa-addons` clones and fast-forwards add-on repositories, lists the
//! repositories of a hosting organization, and registers add-ons as
//! sub-projects of a running supervisory-control project, attaching the
//! managers each add-on declares.
//!
//! ## Quick Start
//!
//! 1. Optionally create `oa-addons.yaml` in the working directory:
//!
//! ```yaml
//! repositories:
//!   base_directory: /opt/projects/addons
//! github:
//!   organization: example-org
//! control_script:
//!   executable: WCCOAui
//!   script: addonManager.ctl
//! ```
//!
//! 2. Clone an add-on and register it:
//!
//! ```bash
//! oa-addons clone https://github.com/example-org/demo.git
//! oa-addons register demo --from-manifest
//! ```
//!
//! 3. Later, pull upstream changes:
//!
//! ```bash
//! oa-addons pull demo
//! ```
//!
//! ## Architecture
//!
//! - [`domain`]: Configuration, repository and sub-project entities, exit and failure classification
//! - [`application`]: Use cases and the [`application::AddonService`] facade
//! - [`infrastructure`]: git, processes, the control-script runtime, the hosting API and files
//! - [`presentation`]: CLI interface and user interaction
//! - [`common`]: Shared error handling
//!
//! ## Use Cases
//!
//! - [`application::use_cases::sync_repository`]: Clone-or-pull of one repository
//! - [`application::use_cases::list_remote_repositories`]: Paginated organization listing
//! - [`application::use_cases::register_sub_project`]: Registration and manager attachment
//! - [`application::use_cases::install_dependencies`]: JavaScript dependency bootstrap
//!
//! ## Error Handling
//!
//! Every use case has its own error enum exposing a
//! [`domain::value_objects::FailureKind`]; all of them convert into
//! [`common::error::AddonError`], and [`Result`] is `Result<T, AddonError>`.
//!
//! ## Examples
//!
//! ```rust,no_run
//! use oa_addons::application::{AddonService, Collaborators};
//! use oa_addons::domain::entities::{AddonConfig, RepositoryReference};
//!
//! # async fn example() -> oa_addons::Result<()> {
//! let config = AddonConfig::default();
//! let collaborators = Collaborators::from_config(&config)?;
//! let service = AddonService::new(config, collaborators).await;
//!
//! let reference = RepositoryReference::new("https://github.com/example-org/demo.git");
//! let result = service.clone_repository(&reference).await?;
//! println!("Working copy at {}", result.repository_path.display());
//! # Ok(())
//! # }
//! ```

#![deny(rustdoc::broken_intra_doc_links)]

pub mod application;
pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

// Re-export commonly used types for convenience
pub use crate::common::error::AddonError;
pub use crate::common::result::AddonResult as Result;
