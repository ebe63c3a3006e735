pub mod addon_manifest;
pub mod config_store;

pub use addon_manifest::AddonManifestReader;
pub use config_store::{ConfigStore, ConfigStoreError, DEFAULT_CONFIG_FILE};
