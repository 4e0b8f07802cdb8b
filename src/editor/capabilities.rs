// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Permission and edit-form queries. A `None` answer means the query was cancelled.

use super::{Editor, EditorError};
use crate::cancellation::{abortable, CancellationToken};
use crate::model::{ElementIri, LinkModel, PropertyTypeIri};
use crate::policy::PolicyError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ElementCapabilities {
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_link: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkCapabilities {
    pub can_edit: bool,
    pub can_delete: bool,
}

impl Editor {
    /// Deleted elements report no capabilities without asking the policy.
    pub async fn element_capabilities(
        &self,
        iri: &ElementIri,
        cancellation: &CancellationToken,
    ) -> Result<Option<ElementCapabilities>, EditorError> {
        let model = self.element_model(iri)?;
        if self.document.authoring.is_deleted_element(iri) {
            return Ok(Some(ElementCapabilities::default()));
        }
        let metadata = self.metadata()?;

        let answer = abortable(cancellation, async {
            Ok::<_, PolicyError>(ElementCapabilities {
                can_edit: metadata.can_edit_element(&model, cancellation).await?,
                can_delete: metadata.can_delete_element(&model, cancellation).await?,
                can_link: metadata.can_link_element(&model, cancellation).await?,
            })
        })
        .await;
        Ok(answer.transpose()?)
    }

    /// Deleted links, and links touching a deleted element, report no capabilities.
    pub async fn link_capabilities(
        &self,
        link: &LinkModel,
        cancellation: &CancellationToken,
    ) -> Result<Option<LinkCapabilities>, EditorError> {
        let source = self.element_model(link.source())?;
        let target = self.element_model(link.target())?;
        if self.document.authoring.is_deleted_link(link) {
            return Ok(Some(LinkCapabilities::default()));
        }
        let metadata = self.metadata()?;

        let answer = abortable(cancellation, async {
            Ok::<_, PolicyError>(LinkCapabilities {
                can_edit: metadata.can_edit_link(link, &source, &target, cancellation).await?,
                can_delete: metadata.can_delete_link(link, &source, &target, cancellation).await?,
            })
        })
        .await;
        Ok(answer.transpose()?)
    }

    /// Properties an edit form should offer for `iri`, across all of its types, in first-seen
    /// order.
    pub async fn property_fields(
        &self,
        iri: &ElementIri,
        cancellation: &CancellationToken,
    ) -> Result<Option<Vec<PropertyTypeIri>>, EditorError> {
        let model = self.element_model(iri)?;
        let metadata = self.metadata()?;

        let answer = abortable(cancellation, async {
            let mut fields: Vec<PropertyTypeIri> = Vec::new();
            for element_type in model.types() {
                for property in metadata.properties_for_type(element_type, cancellation).await? {
                    if !fields.contains(&property) {
                        fields.push(property);
                    }
                }
            }
            Ok::<_, PolicyError>(fields)
        })
        .await;
        Ok(answer.transpose()?)
    }
}
