use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    domain::member::{default_batches, default_plans, CatalogEntry},
    errors::ConfigError,
    form::SubmitPolicy,
    gateway::JsonCollectionGateway,
    utils::{
        paths::{self, ensure_dir},
        persistence::write_atomic,
    },
};

/// Host-tunable settings for the member form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormConfig {
    /// Start over with a blank form after a successful submission.
    pub reset_after_submit: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection_path: Option<PathBuf>,
    pub plans: Vec<CatalogEntry>,
    pub batches: Vec<CatalogEntry>,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            reset_after_submit: false,
            collection_path: None,
            plans: default_plans(),
            batches: default_batches(),
        }
    }
}

impl FormConfig {
    pub fn submit_policy(&self) -> SubmitPolicy {
        SubmitPolicy {
            reset_on_success: self.reset_after_submit,
        }
    }

    /// File-backed gateway at `collection_path`, or the default members
    /// collection under `base`.
    pub fn collection_gateway(&self, base: &Path) -> JsonCollectionGateway {
        match &self.collection_path {
            Some(path) => JsonCollectionGateway::new(path.clone()),
            None => JsonCollectionGateway::in_dir(base),
        }
    }
}

pub struct ConfigManager {
    base: PathBuf,
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_base_dir(paths::app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: paths::config_file_in(&base),
            base,
        })
    }

    pub fn load(&self) -> Result<FormConfig, ConfigError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(FormConfig::default())
        }
    }

    pub fn save(&self, config: &FormConfig) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(config)?;
        write_atomic(&self.path, &json)?;
        tracing::debug!("saved configuration to {}", self.path.display());
        Ok(())
    }

    pub fn base_dir(&self) -> &Path {
        &self.base
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
