// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Editor settings, loadable from JSON.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ElementIri, IdError, LinkTypeIri};

pub const DEFAULT_TEMPORARY_LINK_TYPE: &str = "urn:ontoedit:temporary-link";
pub const DEFAULT_TEMPORARY_IRI_PREFIX: &str = "urn:ontoedit:temporary:";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid editor config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid {field}: {source}")]
    InvalidIri {
        field: &'static str,
        #[source]
        source: IdError,
    },
    #[error("history capacity must be at least 1")]
    ZeroCapacity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub validation: ValidationConfig,
    pub gesture: GestureConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct HistoryConfig {
    /// Undo frames kept; the oldest are dropped first. Unlimited when absent.
    pub capacity: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    pub enabled: bool,
    /// Hold validation passes until flushed instead of starting them on every change.
    pub defer: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { enabled: true, defer: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct GestureConfig {
    /// Link type shown while a drag-to-link gesture waits for the policy.
    pub temporary_link_type: String,
    /// Prefix of placeholder element IRIs created by canvas drops.
    pub temporary_iri_prefix: String,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            temporary_link_type: DEFAULT_TEMPORARY_LINK_TYPE.to_owned(),
            temporary_iri_prefix: DEFAULT_TEMPORARY_IRI_PREFIX.to_owned(),
        }
    }
}

impl GestureConfig {
    pub fn temporary_link_type(&self) -> Result<LinkTypeIri, ConfigError> {
        LinkTypeIri::new(&self.temporary_link_type)
            .map_err(|source| ConfigError::InvalidIri {
                field: "gesture.temporary_link_type",
                source,
            })
    }

    pub fn temporary_iri(&self, n: u64) -> Result<ElementIri, ConfigError> {
        ElementIri::new(format!("{}{n}", self.temporary_iri_prefix))
            .map_err(|source| ConfigError::InvalidIri {
                field: "gesture.temporary_iri_prefix",
                source,
            })
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history.capacity == Some(0) {
            return Err(ConfigError::ZeroCapacity);
        }
        self.gesture.temporary_link_type()?;
        self.gesture.temporary_iri(0)?;
        Ok(())
    }

    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(EditorConfig)
    }
}
