// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Incremental validation of authored elements and their outbound links.
//!
//! A pass compares two authoring states, installs loading placeholders for every element
//! whose inputs changed and issues one [`ValidationApi::validate`] request per such element.
//! Entries of untouched elements are carried over as-is. Results are applied one at a time
//! through [`ValidationState::apply`], which drops any result whose placeholder has since been
//! replaced by a newer request (each placeholder carries the [`RequestId`] it was created for).

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{debug, trace, warn};

use crate::authoring::{AuthoringEvent, AuthoringState};
use crate::cancellation::{abortable, Cancellation, CancellationToken};
use crate::diagram::GraphSnapshot;
use crate::keyed::LinkMap;
use crate::model::{same_link, ElementIri, ElementModel, LinkModel, PropertyTypeIri};
use crate::policy::PolicyError;

/// Everything a validator may look at for one element.
#[derive(Debug, Clone)]
pub struct ValidationRequest {
    pub target: ElementModel,
    pub outbound_links: Vec<LinkModel>,
    pub state: AuthoringState,
    pub model: Arc<GraphSnapshot>,
    /// Cancelled once a newer request for the same element is issued.
    pub cancellation: CancellationToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementError {
    pub target: ElementIri,
    pub message: String,
    pub property_type: Option<PropertyTypeIri>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkError {
    pub target: LinkModel,
    pub message: String,
}

/// A single finding. Findings are matched to entries by target, not by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReport {
    Element(ElementError),
    Link(LinkError),
}

#[async_trait]
pub trait ValidationApi: Send + Sync {
    async fn validate(
        &self,
        request: ValidationRequest,
    ) -> Result<Vec<ValidationReport>, PolicyError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementValidation {
    pub loading: bool,
    pub errors: Vec<ElementError>,
    pub request: RequestId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkValidation {
    pub loading: bool,
    pub errors: Vec<LinkError>,
    pub request: RequestId,
}

/// Per-target validation results. An absent entry means valid and not loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationState {
    pub elements: BTreeMap<ElementIri, ElementValidation>,
    pub links: LinkMap<LinkValidation>,
}

impl ValidationState {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn element(&self, iri: &ElementIri) -> Option<&ElementValidation> {
        self.elements.get(iri)
    }

    pub fn link(&self, link: &LinkModel) -> Option<&LinkValidation> {
        self.links.get(link)
    }

    pub fn is_loading(&self) -> bool {
        self.elements.values().any(|entry| entry.loading)
            || self.links.values().any(|entry| entry.loading)
    }

    pub fn error_count(&self) -> usize {
        self.elements.values().map(|entry| entry.errors.len()).sum::<usize>()
            + self.links.values().map(|entry| entry.errors.len()).sum::<usize>()
    }

    /// Folds one finished request into the state.
    ///
    /// Returns `None` when nothing changed: the request was cancelled, or every entry it
    /// addressed has been superseded by a newer request.
    pub fn apply(&self, outcome: ValidationOutcome) -> Option<Self> {
        let ValidationOutcome { target, request, outbound, result } = outcome;
        let reports = match result {
            None => {
                trace!(element = %target, request = %request, "validation request cancelled");
                return None;
            }
            Some(Ok(reports)) => reports,
            Some(Err(err)) => {
                warn!(element = %target, request = %request, error = %err, "validator failed");
                vec![ValidationReport::Element(ElementError {
                    message: format!("Validation error for element '{target}': {err}"),
                    target: target.clone(),
                    property_type: None,
                })]
            }
        };

        let mut element_errors = Vec::new();
        let mut link_errors: LinkMap<Vec<LinkError>> = LinkMap::new();
        for report in reports {
            match report {
                ValidationReport::Element(error) if error.target == target => {
                    element_errors.push(error);
                }
                ValidationReport::Link(error)
                    if outbound.iter().any(|link| same_link(link, &error.target)) =>
                {
                    match link_errors.get_mut(&error.target) {
                        Some(errors) => errors.push(error),
                        None => {
                            link_errors.insert(error.target.clone(), vec![error]);
                        }
                    }
                }
                other => {
                    debug!(
                        element = %target,
                        report = ?other,
                        "report for unrelated target dropped"
                    );
                }
            }
        }

        let mut next = self.clone();
        let mut applied = false;

        if next.elements.get(&target).is_some_and(|entry| entry.loading && entry.request == request)
        {
            if element_errors.is_empty() {
                next.elements.remove(&target);
            } else {
                let entry = ElementValidation { loading: false, errors: element_errors, request };
                next.elements.insert(target.clone(), entry);
            }
            applied = true;
        }

        for link in &outbound {
            let pending = next.links.get(link);
            if !pending.is_some_and(|entry| entry.loading && entry.request == request) {
                continue;
            }
            match link_errors.remove(link) {
                Some(errors) => {
                    let entry = LinkValidation { loading: false, errors, request };
                    next.links.insert(link.clone(), entry);
                }
                None => {
                    next.links.remove(link);
                }
            }
            applied = true;
        }

        if applied {
            trace!(element = %target, request = %request, "validation result applied");
            Some(next)
        } else {
            debug!(element = %target, request = %request, "stale validation result dropped");
            None
        }
    }
}

/// Result of one validate call, waiting to be applied.
#[derive(Debug)]
pub struct ValidationOutcome {
    target: ElementIri,
    request: RequestId,
    outbound: Vec<LinkModel>,
    /// `None` when the pipeline was shut down before the validator answered.
    result: Option<Result<Vec<ValidationReport>, PolicyError>>,
}

impl ValidationOutcome {
    pub fn target(&self) -> &ElementIri {
        &self.target
    }

    pub fn request(&self) -> RequestId {
        self.request
    }
}

/// Elements whose validation inputs differ between `previous` and `current`.
///
/// That is every element whose own entry changed, the source of every link whose entry
/// changed, and the sources of links pointing at an element that became (or stopped being)
/// deleted.
pub fn changed_elements_to_validate(
    previous: &AuthoringState,
    current: &AuthoringState,
    graph: &GraphSnapshot,
) -> BTreeSet<ElementIri> {
    let mut changed = BTreeSet::new();
    let before = &previous.index().elements;
    let after = &current.index().elements;

    for iri in before.keys().chain(after.keys()) {
        let old = before.get(iri);
        let new = after.get(iri);
        if old == new {
            continue;
        }
        changed.insert(iri.clone());

        let deletion_toggled = old.is_some_and(AuthoringEvent::is_deletion)
            || new.is_some_and(AuthoringEvent::is_deletion);
        if deletion_toggled {
            changed.extend(graph.incoming_links(iri).into_iter().map(|link| link.source().clone()));
        }
    }

    let before = &previous.index().links;
    let after = &current.index().links;
    for link in before.links().chain(after.links()) {
        if before.get(link) != after.get(link) {
            changed.insert(link.source().clone());
        }
    }

    changed
}

/// Issues validate calls and collects their outcomes.
pub struct ValidationPipeline {
    api: Arc<dyn ValidationApi>,
    cancellation: Cancellation,
    next_request: u64,
    /// Token of the newest request per element, dropped once that request finishes.
    latest: BTreeMap<ElementIri, (RequestId, CancellationToken)>,
    in_flight: FuturesUnordered<BoxFuture<'static, ValidationOutcome>>,
}

impl ValidationPipeline {
    pub fn new(api: Arc<dyn ValidationApi>) -> Self {
        Self {
            api,
            cancellation: Cancellation::new(),
            next_request: 0,
            latest: BTreeMap::new(),
            in_flight: FuturesUnordered::new(),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Starts a pass over every element on `graph`.
    ///
    /// Elements in `targets` get fresh loading placeholders (for themselves and their outbound
    /// links) and a validate call; every other element keeps its entries from `previous`.
    pub fn validate_elements(
        &mut self,
        targets: &BTreeSet<ElementIri>,
        graph: Arc<GraphSnapshot>,
        authoring: &AuthoringState,
        previous: &ValidationState,
    ) -> ValidationState {
        let mut next = ValidationState::empty();
        let mut requests = Vec::new();
        self.latest.retain(|iri, _| graph.has_element_iri(iri));

        for (iri, model) in graph.element_models() {
            let outbound: Vec<LinkModel> = graph.outbound_links(iri).into_iter().cloned().collect();

            if !targets.contains(iri) {
                if let Some(entry) = previous.element(iri) {
                    next.elements.insert(iri.clone(), entry.clone());
                }
                for link in &outbound {
                    if let Some(entry) = previous.link(link) {
                        next.links.insert(link.clone(), entry.clone());
                    }
                }
                continue;
            }

            let request = self.allocate();
            let placeholder = ElementValidation { loading: true, errors: Vec::new(), request };
            next.elements.insert(iri.clone(), placeholder);
            for link in &outbound {
                let placeholder = LinkValidation { loading: true, errors: Vec::new(), request };
                next.links.insert(link.clone(), placeholder);
            }
            requests.push((request, model.clone(), outbound));
        }

        for (request, target, outbound) in requests {
            self.spawn(request, target, outbound, authoring.clone(), Arc::clone(&graph));
        }

        debug!(
            targets = targets.len(),
            in_flight = self.in_flight.len(),
            "validation pass started"
        );
        next
    }

    /// Waits for the next finished request. `None` once nothing is in flight.
    pub async fn next_outcome(&mut self) -> Option<ValidationOutcome> {
        let outcome = self.in_flight.next().await?;
        let finished = self.latest.get(&outcome.target);
        if finished.is_some_and(|(request, _)| *request == outcome.request) {
            self.latest.remove(&outcome.target);
        }
        Some(outcome)
    }

    /// Cancels every request in flight; their outcomes resolve as cancelled.
    pub fn cancel_all(&mut self) {
        self.cancellation.abort();
        self.cancellation = Cancellation::new();
        self.latest.clear();
    }

    fn spawn(
        &mut self,
        request: RequestId,
        target: ElementModel,
        outbound: Vec<LinkModel>,
        state: AuthoringState,
        model: Arc<GraphSnapshot>,
    ) {
        let iri = target.id().clone();
        let token = self.cancellation.token().child_token();
        if let Some((_, superseded)) = self.latest.insert(iri.clone(), (request, token.clone())) {
            superseded.cancel();
        }

        let session = self.cancellation.token();
        let api = Arc::clone(&self.api);
        let validate = ValidationRequest {
            target,
            outbound_links: outbound.clone(),
            state,
            model,
            cancellation: token,
        };

        trace!(element = %iri, request = %request, "validation requested");
        self.in_flight.push(Box::pin(async move {
            let result = abortable(&session, api.validate(validate)).await;
            ValidationOutcome { target: iri, request, outbound, result }
        }));
    }

    fn allocate(&mut self) -> RequestId {
        let id = RequestId(self.next_request);
        self.next_request = self.next_request.wrapping_add(1);
        id
    }
}

impl fmt::Debug for ValidationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationPipeline")
            .field("next_request", &self.next_request)
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}
