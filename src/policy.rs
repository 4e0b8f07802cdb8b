// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Caller-supplied authoring policy.
//!
//! The editor never inspects a policy beyond these methods. Every call receives the
//! cancellation token of the gesture that issued it; honoring it is up to the implementation,
//! the editor discards answers that arrive after the token was cancelled either way.

use std::collections::BTreeSet;

use async_trait::async_trait;
use thiserror::Error;

use crate::cancellation::CancellationToken;
use crate::model::{ElementModel, ElementTypeIri, LinkModel, LinkTypeIri, PropertyTypeIri};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("policy failed: {message}")]
    Failed { message: String },
    #[error("policy does not support {operation}")]
    Unsupported { operation: &'static str },
}

impl PolicyError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed { message: message.into() }
    }
}

/// Direction of a permitted link relative to the element the gesture started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LinkDirection {
    Out,
    In,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkTypeOption {
    pub link_type: LinkTypeIri,
    pub direction: LinkDirection,
}

impl LinkTypeOption {
    pub fn out(link_type: LinkTypeIri) -> Self {
        Self { link_type, direction: LinkDirection::Out }
    }

    pub fn incoming(link_type: LinkTypeIri) -> Self {
        Self { link_type, direction: LinkDirection::In }
    }
}

/// Ontology-aware answers to "may the user do this?" questions.
///
/// Permission queries default to allowing everything. `possible_link_types` and
/// `generate_new_element` have no sensible default and must be provided.
#[async_trait]
pub trait MetadataApi: Send + Sync {
    async fn can_drop_on_canvas(
        &self,
        _source: &ElementModel,
        _cancellation: &CancellationToken,
    ) -> Result<bool, PolicyError> {
        Ok(true)
    }

    async fn can_drop_on_element(
        &self,
        _source: &ElementModel,
        _target: &ElementModel,
        _cancellation: &CancellationToken,
    ) -> Result<bool, PolicyError> {
        Ok(true)
    }

    async fn possible_link_types(
        &self,
        source: &ElementModel,
        target: &ElementModel,
        cancellation: &CancellationToken,
    ) -> Result<Vec<LinkTypeOption>, PolicyError>;

    async fn types_of_elements_dragged_from(
        &self,
        _source: &ElementModel,
        _cancellation: &CancellationToken,
    ) -> Result<Vec<ElementTypeIri>, PolicyError> {
        Ok(Vec::new())
    }

    async fn properties_for_type(
        &self,
        _element_type: &ElementTypeIri,
        _cancellation: &CancellationToken,
    ) -> Result<Vec<PropertyTypeIri>, PolicyError> {
        Ok(Vec::new())
    }

    async fn can_delete_element(
        &self,
        _element: &ElementModel,
        _cancellation: &CancellationToken,
    ) -> Result<bool, PolicyError> {
        Ok(true)
    }

    async fn can_edit_element(
        &self,
        _element: &ElementModel,
        _cancellation: &CancellationToken,
    ) -> Result<bool, PolicyError> {
        Ok(true)
    }

    async fn can_link_element(
        &self,
        _element: &ElementModel,
        _cancellation: &CancellationToken,
    ) -> Result<bool, PolicyError> {
        Ok(true)
    }

    async fn can_delete_link(
        &self,
        _link: &LinkModel,
        _source: &ElementModel,
        _target: &ElementModel,
        _cancellation: &CancellationToken,
    ) -> Result<bool, PolicyError> {
        Ok(true)
    }

    async fn can_edit_link(
        &self,
        _link: &LinkModel,
        _source: &ElementModel,
        _target: &ElementModel,
        _cancellation: &CancellationToken,
    ) -> Result<bool, PolicyError> {
        Ok(true)
    }

    async fn generate_new_element(
        &self,
        types: &[ElementTypeIri],
        cancellation: &CancellationToken,
    ) -> Result<ElementModel, PolicyError>;

    async fn filter_constructible_types(
        &self,
        types: &[ElementTypeIri],
        _cancellation: &CancellationToken,
    ) -> Result<BTreeSet<ElementTypeIri>, PolicyError> {
        Ok(types.iter().cloned().collect())
    }
}
