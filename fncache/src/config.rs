// Copyright (c) 2024-2025 fncache Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Catalog configuration

use crate::catalog::error::{CatalogError, CatalogResult};
use crate::storage::StorageType;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What happens to caches that depend on a deleted function or column
///
/// Caches *owned* by a deleted function are always deleted; this only covers
/// caches listing the row in their dependency join tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyDeletePolicy {
    /// Remove the join rows, keep the cache
    #[default]
    Detach,
    /// Delete the dependent caches as well
    Cascade,
}

impl fmt::Display for DependencyDeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyDeletePolicy::Detach => write!(f, "detach"),
            DependencyDeletePolicy::Cascade => write!(f, "cascade"),
        }
    }
}

impl FromStr for DependencyDeletePolicy {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "detach" => Ok(DependencyDeletePolicy::Detach),
            "cascade" => Ok(DependencyDeletePolicy::Cascade),
            other => Err(CatalogError::InvalidConfig(format!(
                "unknown dependency delete policy: {}",
                other
            ))),
        }
    }
}

/// Catalog configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Storage backend
    pub storage_type: StorageType,

    /// Handling of caches that depend on a deleted function or column
    pub dependency_delete_policy: DependencyDeletePolicy,

    /// Flush the store after every mutation
    pub flush_on_write: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::default(),
            dependency_delete_policy: DependencyDeletePolicy::default(),
            flush_on_write: true,
        }
    }
}

impl CatalogConfig {
    /// Volatile catalog, for tests and scratch sessions
    pub fn in_memory() -> Self {
        Self {
            storage_type: StorageType::Memory,
            dependency_delete_policy: DependencyDeletePolicy::Detach,
            flush_on_write: false,
        }
    }

    /// On-disk catalog flushed after every write
    pub fn durable() -> Self {
        Self {
            storage_type: StorageType::Sled,
            dependency_delete_policy: DependencyDeletePolicy::Detach,
            flush_on_write: true,
        }
    }

    pub fn with_dependency_delete_policy(mut self, policy: DependencyDeletePolicy) -> Self {
        self.dependency_delete_policy = policy;
        self
    }

    pub fn validate(&self) -> CatalogResult<()> {
        if self.storage_type == StorageType::Sled && !cfg!(feature = "sled-backend") {
            return Err(CatalogError::InvalidConfig(
                "sled storage requested but the sled-backend feature is disabled".to_string(),
            ));
        }
        if self.storage_type == StorageType::Memory && self.flush_on_write {
            log::warn!("flush_on_write has no effect on in-memory storage");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let config = CatalogConfig::in_memory();
        assert_eq!(config.storage_type, StorageType::Memory);
        assert!(!config.flush_on_write);
        assert!(config.validate().is_ok());

        let config = CatalogConfig::durable();
        assert_eq!(config.storage_type, StorageType::Sled);
        assert_eq!(config.dependency_delete_policy, DependencyDeletePolicy::Detach);
        assert_eq!(config.validate().is_ok(), cfg!(feature = "sled-backend"));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "Cascade".parse::<DependencyDeletePolicy>().unwrap(),
            DependencyDeletePolicy::Cascade
        );
        assert_eq!(DependencyDeletePolicy::Detach.to_string(), "detach");
        assert!(matches!(
            "drop".parse::<DependencyDeletePolicy>(),
            Err(CatalogError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_serializes_lowercase() {
        let config = CatalogConfig::in_memory()
            .with_dependency_delete_policy(DependencyDeletePolicy::Cascade);
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"storage_type\":\"memory\""));
        assert!(json.contains("\"dependency_delete_policy\":\"cascade\""));

        let back: CatalogConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
