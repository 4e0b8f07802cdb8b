// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Ontoedit and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rstest::{fixture, rstest};

use super::{
    Editor, EditorError, EditorEvent, ElementCapabilities, LinkDrop, LinkEnd, LinkGestureOutcome,
};
use crate::authoring::{AuthoringError, AuthoringEvent};
use crate::cancellation::CancellationToken;
use crate::config::EditorConfig;
use crate::diagram::{GraphEvent, Point};
use crate::model::fixtures::{
    element, iri, link, link_type, noted, property, renamed, typed_link, KNOWS, NAME, PERSON,
    WORKS_FOR,
};
use crate::model::{ElementId, ElementModel, ElementTypeIri, PropertyTypeIri};
use crate::policy::{LinkTypeOption, MetadataApi, PolicyError};
use crate::validation::{ElementError, ValidationApi, ValidationReport, ValidationRequest};

struct TestPolicy {
    refuse_drop: bool,
    hang: bool,
    link_types: Vec<LinkTypeOption>,
    properties: Vec<PropertyTypeIri>,
}

impl TestPolicy {
    fn knows() -> Self {
        Self {
            refuse_drop: false,
            hang: false,
            link_types: vec![LinkTypeOption::out(link_type(KNOWS))],
            properties: vec![property(NAME)],
        }
    }
}

#[async_trait]
impl MetadataApi for TestPolicy {
    async fn can_drop_on_element(
        &self,
        _source: &ElementModel,
        _target: &ElementModel,
        _cancellation: &CancellationToken,
    ) -> Result<bool, PolicyError> {
        Ok(!self.refuse_drop)
    }

    async fn possible_link_types(
        &self,
        _source: &ElementModel,
        _target: &ElementModel,
        cancellation: &CancellationToken,
    ) -> Result<Vec<LinkTypeOption>, PolicyError> {
        if self.hang {
            cancellation.cancelled().await;
        }
        Ok(self.link_types.clone())
    }

    async fn types_of_elements_dragged_from(
        &self,
        _source: &ElementModel,
        _cancellation: &CancellationToken,
    ) -> Result<Vec<ElementTypeIri>, PolicyError> {
        Ok(vec![ElementTypeIri::new(PERSON).expect("type")])
    }

    async fn properties_for_type(
        &self,
        _element_type: &ElementTypeIri,
        _cancellation: &CancellationToken,
    ) -> Result<Vec<PropertyTypeIri>, PolicyError> {
        Ok(self.properties.clone())
    }

    async fn can_delete_element(
        &self,
        element: &ElementModel,
        _cancellation: &CancellationToken,
    ) -> Result<bool, PolicyError> {
        Ok(element.label() != "locked")
    }

    async fn generate_new_element(
        &self,
        types: &[ElementTypeIri],
        _cancellation: &CancellationToken,
    ) -> Result<ElementModel, PolicyError> {
        let mut model = ElementModel::new(iri("urn:generated")).with_label("Generated");
        model.set_types(types.iter().cloned());
        Ok(model)
    }
}

/// Labels containing `slow` answer late; labels containing `bad` get an element error.
struct LabelValidator;

#[async_trait]
impl ValidationApi for LabelValidator {
    async fn validate(
        &self,
        request: ValidationRequest,
    ) -> Result<Vec<ValidationReport>, PolicyError> {
        let label = request.target.label().to_owned();
        let delay = if label.contains("slow") { 100 } else { 10 };
        tokio::time::sleep(Duration::from_millis(delay)).await;

        if !label.contains("bad") {
            return Ok(Vec::new());
        }
        Ok(vec![ValidationReport::Element(ElementError {
            target: request.target.id().clone(),
            message: format!("{label} is bad"),
            property_type: None,
        })])
    }
}

fn load(mut editor: Editor) -> Editor {
    editor
        .load_diagram(
            vec![
                (element("urn:a"), Point::new(0.0, 0.0)),
                (element("urn:b"), Point::new(100.0, 0.0)),
            ],
            vec![link("urn:a", "urn:b")],
        )
        .expect("load");
    editor
}

/// Persisted `urn:a -knows-> urn:b`, permissive policy, no validator.
#[fixture]
fn editor() -> Editor {
    let editor = Editor::new(EditorConfig::default())
        .expect("editor")
        .with_metadata_api(Arc::new(TestPolicy::knows()));
    load(editor)
}

fn cell(editor: &Editor, value: &str) -> ElementId {
    editor.graph().cells().elements_by_iri(&iri(value)).next().expect("cell").id.clone()
}

fn record_events(editor: &mut Editor) -> Rc<RefCell<Vec<EditorEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    editor.listen(move |event| sink.borrow_mut().push(*event));
    seen
}

#[rstest]
fn create_entity_round_trips_through_undo(mut editor: Editor) {
    let graph_before = editor.graph().snapshot();
    let authoring_before = editor.authoring_state().clone();
    let events = record_events(&mut editor);

    let id = editor.create_entity(element("urn:c"), Point::new(10.0, 20.0)).expect("create");
    assert!(editor.authoring_state().is_new_element(&iri("urn:c")));
    assert_eq!(
        editor.graph().get_element(&id).map(|cell| cell.position),
        Some(Point::new(10.0, 20.0))
    );
    assert_eq!(editor.history().undo_titles(), vec!["Create new entity"]);
    assert!(events.borrow().contains(&EditorEvent::AuthoringStateChanged));

    assert!(editor.undo().expect("undo"));
    assert_eq!(editor.graph().snapshot(), graph_before);
    assert_eq!(editor.authoring_state(), &authoring_before);

    assert!(editor.redo().expect("redo"));
    assert!(editor.graph().get_element(&id).is_some());
    assert!(editor.authoring_state().is_new_element(&iri("urn:c")));
}

#[rstest]
fn duplicate_entities_are_rejected_without_history(mut editor: Editor) {
    let result = editor.create_entity(element("urn:a"), Point::default());

    assert!(matches!(result, Err(EditorError::ElementAlreadyExists(_))));
    assert_eq!(editor.history().undo_len(), 0);
    assert_eq!(editor.graph().cells().element_count(), 2);
}

#[rstest]
fn changing_a_persisted_entity_records_its_baseline(mut editor: Editor) {
    let edited = renamed(&element("urn:a"), "Alice");
    editor.change_entity(&iri("urn:a"), edited.clone()).expect("change");

    assert_eq!(
        editor.authoring_state().element_event(&iri("urn:a")),
        Some(&AuthoringEvent::ChangeElement {
            before: Some(element("urn:a")),
            after: edited.clone(),
        })
    );
    let a = cell(&editor, "urn:a");
    assert_eq!(editor.graph().get_element(&a).map(|cell| &cell.data), Some(&edited));
}

#[rstest]
fn persisted_iris_cannot_change(mut editor: Editor) {
    let mut moved = element("urn:a");
    moved.set_id(iri("urn:z"));

    let result = editor.change_entity(&iri("urn:a"), moved);
    assert!(matches!(
        result,
        Err(EditorError::Authoring(AuthoringError::PersistedIriChange { .. }))
    ));
    assert_eq!(editor.history().undo_len(), 0);
    assert!(editor.graph().cells().has_element_iri(&iri("urn:a")));
}

#[rstest]
fn renaming_a_new_entity_rewrites_its_links(mut editor: Editor) {
    editor.create_entity(element("urn:draft"), Point::default()).expect("create");
    editor.create_new_link(link("urn:a", "urn:draft")).expect("link");

    let mut final_model = element("urn:draft");
    final_model.set_id(iri("urn:final"));
    editor.change_entity(&iri("urn:draft"), final_model).expect("rename");

    assert!(editor.authoring_state().is_new_element(&iri("urn:final")));
    assert!(editor.authoring_state().is_new_link(&link("urn:a", "urn:final")));
    assert!(editor
        .graph()
        .cells()
        .incoming_links(&iri("urn:final"))
        .contains(&&link("urn:a", "urn:final")));
    assert!(!editor.graph().cells().has_element_iri(&iri("urn:draft")));
}

#[rstest]
fn deleting_a_persisted_entity_keeps_it_and_drops_its_new_links(mut editor: Editor) {
    editor.create_entity(element("urn:c"), Point::default()).expect("create");
    editor.create_new_link(link("urn:a", "urn:c")).expect("link");

    editor.delete_entity(&iri("urn:a")).expect("delete");

    let state = editor.authoring_state();
    assert!(state.is_deleted_element(&iri("urn:a")));
    assert!(state.is_deleted_link(&link("urn:a", "urn:b")));
    assert!(state.link_event(&link("urn:a", "urn:c")).is_none());
    assert!(state.is_new_element(&iri("urn:c")));
    assert!(editor.graph().cells().has_element_iri(&iri("urn:a")));
    assert_eq!(editor.graph().cells().outbound_links(&iri("urn:a")), vec![&link("urn:a", "urn:b")]);

    let frames = editor.history().undo_len();
    editor.change_entity(&iri("urn:a"), renamed(&element("urn:a"), "ignored")).expect("no-op");
    editor.delete_entity(&iri("urn:a")).expect("no-op");
    assert_eq!(editor.history().undo_len(), frames);

    editor.undo().expect("undo");
    assert!(editor.authoring_state().is_new_link(&link("urn:a", "urn:c")));
    assert!(editor
        .graph()
        .cells()
        .outbound_links(&iri("urn:a"))
        .contains(&&link("urn:a", "urn:c")));
}

#[rstest]
fn deleting_a_new_entity_leaves_nothing_behind(mut editor: Editor) {
    editor.create_entity(element("urn:c"), Point::default()).expect("create");
    editor.delete_entity(&iri("urn:c")).expect("delete");

    assert!(editor.authoring_state().is_empty());
    assert!(!editor.graph().cells().has_element_iri(&iri("urn:c")));
    assert_eq!(editor.history().undo_titles(), vec!["Create new entity", "Delete entity"]);
}

#[rstest]
fn duplicate_links_discard_the_batch(mut editor: Editor) {
    let before = editor.graph().snapshot();

    let result = editor.create_new_link(link("urn:a", "urn:b"));
    assert!(matches!(result, Err(EditorError::LinkAlreadyExists(_))));
    let missing = editor.create_new_link(link("urn:a", "urn:nowhere"));
    assert!(matches!(missing, Err(EditorError::ElementNotFound(_))));

    assert_eq!(editor.graph().snapshot(), before);
    assert!(editor.authoring_state().is_empty());
    assert!(!editor.history().can_undo());
    assert_eq!(editor.history().open_batch_title(), None);
}

#[rstest]
fn property_edits_keep_the_link(mut editor: Editor) {
    let ab = link("urn:a", "urn:b");
    editor.change_link(&ab, noted(&ab, "colleague")).expect("edit");

    assert_eq!(
        editor.authoring_state().events(),
        [AuthoringEvent::ChangeLink { before: Some(ab.clone()), after: noted(&ab, "colleague") }]
    );
    assert_eq!(
        editor.graph().cells().outbound_links(&iri("urn:a")),
        vec![&noted(&ab, "colleague")]
    );
}

#[rstest]
fn identity_edits_replace_the_link(mut editor: Editor) {
    let ab = link("urn:a", "urn:b");
    let works_for = typed_link(WORKS_FOR, "urn:a", "urn:b");
    editor.change_link(&ab, works_for.clone()).expect("replace");

    assert_eq!(
        editor.authoring_state().events(),
        [
            AuthoringEvent::DeleteLink { model: ab.clone() },
            AuthoringEvent::ChangeLink { before: None, after: works_for.clone() },
        ]
    );
    assert_eq!(editor.history().undo_titles(), vec!["Change link"]);

    editor.undo().expect("undo");
    assert!(editor.authoring_state().is_empty());
    assert_eq!(editor.graph().cells().outbound_links(&iri("urn:a")), vec![&ab]);
}

#[rstest]
fn moving_a_link_target_deletes_and_recreates(mut editor: Editor) {
    editor.create_entity(element("urn:c"), Point::default()).expect("create");
    let ab = link("urn:a", "urn:b");

    editor.move_link_target(&ab, &iri("urn:c")).expect("move");

    assert!(editor.authoring_state().is_deleted_link(&ab));
    assert!(editor.authoring_state().is_new_link(&link("urn:a", "urn:c")));
    assert_eq!(editor.history().undo_titles().last(), Some(&"Move link target"));
}

#[rstest]
fn moving_a_link_onto_its_own_endpoint_changes_nothing(mut editor: Editor) {
    let ab = link("urn:a", "urn:b");
    let before = editor.graph().snapshot();
    let events = record_events(&mut editor);

    let target = editor.move_link_target(&ab, &iri("urn:b")).expect("move target");
    let source = editor.move_link_source(&ab, &iri("urn:a")).expect("move source");

    assert_eq!(target.len(), 1);
    assert_eq!(source, target);
    assert!(editor.authoring_state().is_empty());
    assert_eq!(editor.history().undo_len(), 0);
    assert_eq!(editor.graph().snapshot(), before);
    assert!(events.borrow().is_empty());
}

#[rstest]
fn deleting_a_new_link_removes_its_cells(mut editor: Editor) {
    editor.create_new_link(link("urn:b", "urn:a")).expect("link");
    editor.delete_link(&link("urn:b", "urn:a")).expect("delete");

    assert!(editor.authoring_state().is_empty());
    assert!(editor.graph().cells().outbound_links(&iri("urn:b")).is_empty());
}

#[rstest]
fn discarding_a_new_entity_removes_it_and_its_links(mut editor: Editor) {
    editor.create_entity(element("urn:c"), Point::default()).expect("create");
    editor.create_new_link(link("urn:a", "urn:c")).expect("link");
    let creation = editor.authoring_state().element_event(&iri("urn:c")).cloned().expect("event");

    editor.discard_change(&creation).expect("discard");

    assert!(editor.authoring_state().is_empty());
    assert!(!editor.graph().cells().has_element_iri(&iri("urn:c")));
    assert_eq!(editor.graph().cells().link_count(), 1);

    editor.undo().expect("undo");
    assert!(editor.authoring_state().is_new_link(&link("urn:a", "urn:c")));
}

#[rstest]
fn discarding_a_property_change_restores_persisted_data(mut editor: Editor) {
    editor.change_entity(&iri("urn:a"), renamed(&element("urn:a"), "Alice")).expect("change");
    let change = editor.authoring_state().element_event(&iri("urn:a")).cloned().expect("event");

    editor.discard_change(&change).expect("discard");

    let a = cell(&editor, "urn:a");
    assert_eq!(
        editor.graph().get_element(&a).map(|cell| cell.data.clone()),
        Some(element("urn:a"))
    );
    assert!(editor.authoring_state().is_empty());
}

#[rstest]
fn moving_an_element_is_a_single_undo_step(mut editor: Editor) {
    let a = cell(&editor, "urn:a");
    let events = record_events(&mut editor);

    editor.move_element(&a, Point::new(40.0, 40.0)).expect("move");
    assert_eq!(editor.history().undo_titles(), vec!["Move element"]);
    assert_eq!(*events.borrow(), vec![EditorEvent::HistoryChanged]);

    editor.undo().expect("undo");
    assert_eq!(
        editor.graph().get_element(&a).map(|cell| cell.position),
        Some(Point::new(0.0, 0.0))
    );
}

#[rstest]
fn removing_the_selection_is_one_batch(mut editor: Editor) {
    let a = cell(&editor, "urn:a");
    let b = cell(&editor, "urn:b");
    editor.set_selection([a, b, ElementId::new("element-unknown").expect("id")]);
    assert_eq!(editor.selection().len(), 2);

    editor.remove_selected_elements().expect("remove");

    assert!(editor.authoring_state().is_deleted_element(&iri("urn:a")));
    assert!(editor.authoring_state().is_deleted_element(&iri("urn:b")));
    assert_eq!(editor.history().undo_titles(), vec!["Delete selected elements"]);
}

#[rstest]
fn set_authoring_state_is_undoable(mut editor: Editor) {
    let state = editor.authoring_state().delete_element(&element("urn:b"));
    editor.set_authoring_state(state.clone()).expect("set");
    assert_eq!(editor.authoring_state(), &state);

    editor.undo().expect("undo");
    assert!(editor.authoring_state().is_empty());
}

#[rstest]
fn graph_listeners_see_cell_changes(mut editor: Editor) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    editor.listen_graph(move |event| sink.borrow_mut().push(event.clone()));

    let id = editor.create_entity(element("urn:c"), Point::default()).expect("create");
    assert!(seen.borrow().contains(&GraphEvent::ElementAdded(id)));
}

#[rstest]
#[tokio::test]
async fn canvas_drop_creates_element_and_link_in_one_step(mut editor: Editor) {
    let before = editor.graph().snapshot();
    let a = cell(&editor, "urn:a");
    let token = CancellationToken::new();

    let outcome = editor
        .drag_link(&a, LinkDrop::Canvas { position: Point::new(50.0, 50.0) }, &token)
        .await
        .expect("gesture");

    let LinkGestureOutcome::Created {
        element: Some(created),
        link: created_link,
        cells,
    } = outcome
    else {
        panic!("expected a created element");
    };
    assert_eq!(created_link, link("urn:a", "urn:generated"));
    assert_eq!(cells.len(), 1);
    assert_eq!(
        editor.graph().get_element(&created).map(|cell| cell.position),
        Some(Point::new(50.0, 50.0))
    );
    assert!(editor.temporary_state().is_empty());
    assert!(!editor.graph().cells().has_element_iri(&iri("urn:ontoedit:temporary:0")));
    assert_eq!(editor.history().undo_titles(), vec!["Create link"]);

    editor.undo().expect("undo");
    assert_eq!(editor.graph().snapshot(), before);
    assert!(editor.authoring_state().is_empty());
}

#[rstest]
#[tokio::test]
async fn refused_drops_leave_no_trace(editor: Editor) {
    let mut editor = editor.with_metadata_api(Arc::new(TestPolicy {
        refuse_drop: true,
        ..TestPolicy::knows()
    }));
    let before = editor.graph().snapshot();
    let (a, b) = (cell(&editor, "urn:a"), cell(&editor, "urn:b"));

    let outcome = editor
        .drag_link(&a, LinkDrop::Element { target: b }, &CancellationToken::new())
        .await
        .expect("gesture");

    assert_eq!(outcome, LinkGestureOutcome::Rejected);
    assert_eq!(editor.graph().snapshot(), before);
    assert!(!editor.history().can_undo());
    assert!(editor.temporary_state().is_empty());
}

#[rstest]
#[tokio::test]
async fn cancelled_gestures_roll_back_the_preview(editor: Editor) {
    let mut editor = editor.with_metadata_api(Arc::new(TestPolicy {
        hang: true,
        ..TestPolicy::knows()
    }));
    let before = editor.graph().snapshot();
    let (a, b) = (cell(&editor, "urn:a"), cell(&editor, "urn:b"));
    let previews = Rc::new(RefCell::new(0));
    let counter = previews.clone();
    editor.listen_graph(move |event| {
        if matches!(event, GraphEvent::LinkAdded(_)) {
            *counter.borrow_mut() += 1;
        }
    });

    let token = CancellationToken::new();
    let (outcome, ()) = tokio::join!(
        editor.drag_link(&a, LinkDrop::Element { target: b }, &token),
        async {
            token.cancel();
        }
    );

    assert_eq!(outcome.expect("gesture"), LinkGestureOutcome::Cancelled);
    assert_eq!(*previews.borrow(), 1);
    assert_eq!(editor.graph().snapshot(), before);
    assert!(!editor.history().can_undo());
    assert_eq!(editor.history().open_batch_title(), None);
    assert!(editor.temporary_state().is_empty());
}

#[rstest]
#[tokio::test]
async fn dropping_a_gesture_midway_rolls_back_the_preview(editor: Editor) {
    let mut editor = editor.with_metadata_api(Arc::new(TestPolicy {
        hang: true,
        ..TestPolicy::knows()
    }));
    let before = editor.graph().snapshot();
    let a = cell(&editor, "urn:a");
    let token = CancellationToken::new();

    {
        let gesture = editor.drag_link(&a, LinkDrop::Canvas { position: Point::default() }, &token);
        futures::pin_mut!(gesture);
        assert!(futures::poll!(gesture.as_mut()).is_pending());
    }

    assert_eq!(editor.graph().snapshot(), before);
    assert_eq!(editor.history().open_batch_title(), None);
    assert!(editor.temporary_state().is_empty());
}

#[rstest]
#[tokio::test]
async fn reconnect_follows_the_policy(editor: Editor) {
    let mut editor = editor;
    editor.create_entity(element("urn:c"), Point::default()).expect("create");
    let ab = link("urn:a", "urn:b");
    let token = CancellationToken::new();

    let outcome = editor
        .reconnect_link(&ab, LinkEnd::Target, &iri("urn:c"), &token)
        .await
        .expect("reconnect");
    let expected = link("urn:a", "urn:c");
    assert!(matches!(
        outcome,
        LinkGestureOutcome::Created { link: ref moved, .. } if moved == &expected
    ));
    assert!(editor.authoring_state().is_deleted_link(&ab));

    let mut editor = editor.with_metadata_api(Arc::new(TestPolicy {
        link_types: vec![LinkTypeOption::out(link_type(WORKS_FOR))],
        ..TestPolicy::knows()
    }));
    let frames = editor.history().undo_len();
    let outcome = editor
        .reconnect_link(&link("urn:a", "urn:c"), LinkEnd::Source, &iri("urn:b"), &token)
        .await
        .expect("reconnect");
    assert_eq!(outcome, LinkGestureOutcome::Rejected);
    assert_eq!(editor.history().undo_len(), frames);
}

#[rstest]
#[tokio::test]
async fn reconnecting_to_the_same_element_changes_nothing(mut editor: Editor) {
    let ab = link("urn:a", "urn:b");
    let token = CancellationToken::new();

    let outcome = editor
        .reconnect_link(&ab, LinkEnd::Target, &iri("urn:b"), &token)
        .await
        .expect("reconnect");

    assert!(matches!(outcome, LinkGestureOutcome::Created { ref cells, .. } if cells.len() == 1));
    assert!(editor.authoring_state().is_empty());
    assert_eq!(editor.history().undo_len(), 0);
}

#[rstest]
#[tokio::test]
async fn capabilities_come_from_the_policy_unless_deleted(mut editor: Editor) {
    let token = CancellationToken::new();
    editor.change_entity(&iri("urn:a"), renamed(&element("urn:a"), "locked")).expect("change");

    let a = editor.element_capabilities(&iri("urn:a"), &token).await.expect("query");
    assert_eq!(a, Some(ElementCapabilities { can_edit: true, can_delete: false, can_link: true }));

    editor.delete_entity(&iri("urn:b")).expect("delete");
    let b = editor.element_capabilities(&iri("urn:b"), &token).await.expect("query");
    assert_eq!(b, Some(ElementCapabilities::default()));
    let ab = editor.link_capabilities(&link("urn:a", "urn:b"), &token).await.expect("query");
    assert_eq!(ab.map(|caps| caps.can_edit), Some(false));

    let fields = editor.property_fields(&iri("urn:a"), &token).await.expect("query");
    assert_eq!(fields, Some(vec![property(NAME)]));

    token.cancel();
    assert_eq!(editor.property_fields(&iri("urn:a"), &token).await.expect("query"), None);
}

#[rstest]
#[tokio::test]
async fn policy_queries_need_a_policy() {
    let editor = load(Editor::new(EditorConfig::default()).expect("editor"));
    let result = editor.element_capabilities(&iri("urn:a"), &CancellationToken::new()).await;
    assert!(matches!(result, Err(EditorError::MissingMetadataApi)));
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn stale_validation_results_never_overwrite_newer_ones() {
    let editor = Editor::new(EditorConfig::default())
        .expect("editor")
        .with_validation_api(Arc::new(LabelValidator));
    let mut editor = load(editor);

    editor
        .change_entity(&iri("urn:a"), renamed(&element("urn:a"), "slow bad"))
        .expect("first change");
    assert!(editor.validation_state().element(&iri("urn:a")).is_some_and(|entry| entry.loading));
    editor
        .change_entity(&iri("urn:a"), renamed(&element("urn:a"), "fast good"))
        .expect("second change");

    assert_eq!(editor.next_validation().await, Some(true));
    assert!(editor.validation_state().element(&iri("urn:a")).is_none());
    assert_eq!(editor.next_validation().await, Some(false));
    assert_eq!(editor.next_validation().await, None);
    assert!(!editor.validation_state().is_loading());
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn deferred_validation_waits_for_a_flush() {
    let config = EditorConfig::from_json_str(r#"{"validation":{"defer":true}}"#).expect("config");
    let editor = Editor::new(config).expect("editor").with_validation_api(Arc::new(LabelValidator));
    let mut editor = load(editor);

    editor.create_entity(renamed(&element("urn:c"), "bad c"), Point::default()).expect("create");
    editor.change_entity(&iri("urn:b"), renamed(&element("urn:b"), "bad b")).expect("change");
    assert!(!editor.validation_state().is_loading());

    assert!(editor.flush_validation());
    assert!(editor.validation_state().is_loading());
    assert!(!editor.flush_validation());

    editor.run_validation().await;
    assert_eq!(editor.validation_state().error_count(), 2);

    editor.undo().expect("undo");
    editor.run_validation().await;
    assert!(editor.validation_state().element(&iri("urn:b")).is_none());
    assert!(editor.validation_state().element(&iri("urn:c")).is_some());
}
