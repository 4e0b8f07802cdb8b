// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Semantic data model: element and link payloads plus the typed ids used across the crate.

pub mod element;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;
pub mod link;

pub use element::{ElementModel, ElementTypes};
pub use ids::{
    ElementId, ElementIri, ElementTypeIri, Id, IdError, LinkId, LinkTypeIri, PropertyTypeIri,
};
pub use link::{same_link, LinkKey, LinkModel};
