//! Brain associations of a knowledge item row
//!
//! Each row owns an [`AssociationManager`]: the connected-brain badges, the
//! "add to brains" modal and navigation to a brain's studio page. The
//! manager never writes links itself; confirmed writes from the
//! [`AssociationApi`] are the only thing that changes an item's brains.

use super::store::KnowledgeStore;
use crate::api::{AssociationApi, Navigator};
use crate::knowledge::{Brain, KMSElement, StatusClass};
use crate::Result;
use futures::future::join_all;

/// Default path prefix of a brain's studio page
pub const DEFAULT_STUDIO_PATH: &str = "/studio";

/// The UI event that triggered an action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiEvent {
    propagation_stopped: bool,
    default_prevented: bool,
}

impl UiEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    /// Whether containing handlers (e.g. row navigation) may still see it
    pub fn propagates(&self) -> bool {
        !self.propagation_stopped
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Overlay drawn on a connected brain's badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    Waiting,
    Error,
}

impl Indicator {
    /// Derived from the item's status; never stored
    pub fn for_item(item: &KMSElement) -> Option<Self> {
        match item.status_class() {
            StatusClass::Waiting => Some(Indicator::Waiting),
            StatusClass::Error => Some(Indicator::Error),
            StatusClass::Settled => None,
        }
    }
}

/// A connected brain as shown in a row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrainBadge<'a> {
    pub brain: &'a Brain,
    pub indicator: Option<Indicator>,
}

impl BrainBadge<'_> {
    /// Badge is dimmed while the item is waiting or failed
    pub fn dimmed(&self) -> bool {
        self.indicator.is_some()
    }
}

/// State of the open "add to brains" modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationModal {
    pub item_id: String,
    selected: Vec<String>,
    pub submitting: bool,
    pub error: Option<String>,
    /// Token of the submission in flight for this modal
    submission: Option<u64>,
}

impl AssociationModal {
    fn new(item_id: &str) -> Self {
        Self {
            item_id: item_id.to_string(),
            selected: Vec::new(),
            submitting: false,
            error: None,
            submission: None,
        }
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, brain_id: &str) -> bool {
        self.selected.iter().any(|b| b == brain_id)
    }
}

/// Links to write for one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRequest {
    pub item_id: String,
    pub brain_ids: Vec<String>,
    /// Ties the results back to the modal that issued them
    pub submission: u64,
}

impl LinkRequest {
    /// Request not issued by a modal
    pub fn new(item_id: impl Into<String>, brain_ids: Vec<String>) -> Self {
        Self {
            item_id: item_id.into(),
            brain_ids,
            submission: 0,
        }
    }
}

/// Result of a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Every selected link was written; modal closed
    Linked(Vec<String>),
    /// Some writes failed; confirmed ones were applied, modal stays open
    PartiallyFailed {
        linked: Vec<String>,
        failed: Vec<String>,
    },
    /// Nothing to submit (no modal, nothing selected, or already submitting)
    Idle,
}

/// Per-row association state
#[derive(Debug, Clone)]
pub struct AssociationManager {
    modal: Option<AssociationModal>,
    studio_path: String,
    submissions: u64,
}

impl Default for AssociationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AssociationManager {
    pub fn new() -> Self {
        Self::with_studio_path(DEFAULT_STUDIO_PATH)
    }

    pub fn with_studio_path(studio_path: impl Into<String>) -> Self {
        Self {
            modal: None,
            studio_path: studio_path.into().trim_end_matches('/').to_string(),
            submissions: 0,
        }
    }

    pub fn modal(&self) -> Option<&AssociationModal> {
        self.modal.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.modal.is_some()
    }

    /// Open the modal for `item`.
    ///
    /// The triggering event never reaches the row's own click handler.
    /// Returns false if a modal is already open on this row.
    pub fn open_association_modal(&mut self, item: &KMSElement, event: &mut UiEvent) -> bool {
        event.stop_propagation();
        event.prevent_default();

        if self.modal.is_some() {
            return false;
        }
        tracing::debug!(item = %item.id, "Opening association modal");
        self.modal = Some(AssociationModal::new(&item.id));
        true
    }

    /// Close without touching association data
    pub fn close_association_modal(&mut self) {
        if let Some(modal) = self.modal.take() {
            tracing::debug!(item = %modal.item_id, "Closing association modal");
        }
    }

    /// Flip a brain in the modal's selection. Returns whether it is selected
    /// afterwards.
    pub fn toggle_brain(&mut self, brain_id: &str) -> bool {
        let Some(modal) = self.modal.as_mut() else {
            return false;
        };
        if modal.submitting {
            return modal.is_selected(brain_id);
        }
        if let Some(pos) = modal.selected.iter().position(|b| b == brain_id) {
            modal.selected.remove(pos);
            false
        } else {
            modal.selected.push(brain_id.to_string());
            true
        }
    }

    /// Id a brain is navigated to: its routable `brain_id` when present
    pub fn resolve_target<'a>(&self, brain: &'a Brain) -> &'a str {
        brain.route_id()
    }

    pub fn studio_path_for(&self, brain: &Brain) -> String {
        format!("{}/{}", self.studio_path, self.resolve_target(brain))
    }

    pub fn navigate_to_associated_entity(&self, brain: &Brain, navigator: &dyn Navigator) {
        navigator.go_to(&self.studio_path_for(brain));
    }

    /// Brains the item is linked to, in directory order
    pub fn connected_brains<'a>(item: &KMSElement, brains: &'a [Brain]) -> Vec<&'a Brain> {
        brains
            .iter()
            .filter(|brain| item.brains.iter().any(|id| brain.matches(id)))
            .collect()
    }

    /// Brains offered by the modal: those not linked yet
    pub fn available_brains<'a>(item: &KMSElement, brains: &'a [Brain]) -> Vec<&'a Brain> {
        brains
            .iter()
            .filter(|brain| !item.brains.iter().any(|id| brain.matches(id)))
            .collect()
    }

    /// Badges for the row, each with the overlay derived from item status
    pub fn badges<'a>(item: &KMSElement, brains: &'a [Brain]) -> Vec<BrainBadge<'a>> {
        let indicator = Indicator::for_item(item);
        Self::connected_brains(item, brains)
            .into_iter()
            .map(|brain| BrainBadge { brain, indicator })
            .collect()
    }

    /// Take the current selection for writing. The modal is marked as
    /// submitting until [`finish_submit`](Self::finish_submit).
    pub fn begin_submit(&mut self) -> Option<LinkRequest> {
        let modal = self.modal.as_mut()?;
        if modal.submitting || modal.selected.is_empty() {
            return None;
        }
        self.submissions += 1;
        modal.submitting = true;
        modal.error = None;
        modal.submission = Some(self.submissions);
        Some(LinkRequest {
            item_id: modal.item_id.clone(),
            brain_ids: modal.selected.clone(),
            submission: self.submissions,
        })
    }

    /// Apply the write results of a submission.
    ///
    /// Confirmed links are added to the displayed item. If any write
    /// failed, the modal stays open with the failed brains still selected.
    /// A modal that was closed and reopened since the request was issued is
    /// left alone.
    pub fn finish_submit(
        &mut self,
        store: &mut KnowledgeStore,
        request: &LinkRequest,
        results: Vec<(String, Result<()>)>,
    ) -> SubmitOutcome {
        let mut linked = Vec::new();
        let mut failed = Vec::new();
        let mut errors = Vec::new();

        for (brain_id, result) in results {
            match result {
                Ok(()) => linked.push(brain_id),
                Err(e) => {
                    tracing::error!(item = %request.item_id, brain = %brain_id, error = %e, "Failed to link knowledge to brain");
                    errors.push(e.to_string());
                    failed.push(brain_id);
                }
            }
        }

        if !linked.is_empty() {
            store.update_item(&request.item_id, |item| {
                for brain_id in &linked {
                    item.add_brain(brain_id);
                }
            });
        }

        let same_modal = self
            .modal
            .as_ref()
            .is_some_and(|m| {
                m.item_id == request.item_id && m.submission == Some(request.submission)
            });

        if failed.is_empty() {
            if same_modal {
                self.modal = None;
            }
            tracing::info!(item = %request.item_id, brains = linked.len(), "Knowledge linked to brains");
            return SubmitOutcome::Linked(linked);
        }

        if let Some(modal) = self.modal.as_mut().filter(|_| same_modal) {
            modal.submitting = false;
            modal.submission = None;
            modal.selected = failed.clone();
            modal.error = Some(errors.join("; "));
        }
        SubmitOutcome::PartiallyFailed { linked, failed }
    }

    /// Write the current selection and wait for the results
    pub async fn submit(
        &mut self,
        store: &mut KnowledgeStore,
        api: &dyn AssociationApi,
    ) -> SubmitOutcome {
        let Some(request) = self.begin_submit() else {
            return SubmitOutcome::Idle;
        };
        let results = write_links(api, &request).await;
        self.finish_submit(store, &request, results)
    }
}

/// Issue one link write per selected brain, concurrently
pub async fn write_links(
    api: &dyn AssociationApi,
    request: &LinkRequest,
) -> Vec<(String, Result<()>)> {
    let writes = request.brain_ids.iter().map(|brain_id| async move {
        let result = api.link_item_to_brain(&request.item_id, brain_id).await;
        (brain_id.clone(), result)
    });
    join_all(writes).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryBackend, RecordingNavigator};
    use crate::knowledge::KnowledgeStatus;

    fn brains() -> Vec<Brain> {
        vec![
            Brain::new("b1", "Research"),
            Brain::new("b2", "Support").with_brain_id("support-studio"),
            Brain::new("b3", "Legal"),
        ]
    }

    fn store_with(item: KMSElement) -> KnowledgeStore {
        let mut store = KnowledgeStore::new();
        store.set_listing(vec![item]);
        store
    }

    #[test]
    fn test_open_stops_propagation() {
        let item = KMSElement::file("k1", "a.pdf");
        let mut manager = AssociationManager::new();
        let mut event = UiEvent::new();

        assert!(manager.open_association_modal(&item, &mut event));
        assert!(!event.propagates());
        assert!(event.default_prevented());
        assert_eq!(manager.modal().unwrap().item_id, "k1");
    }

    #[test]
    fn test_single_modal_per_row() {
        let item = KMSElement::file("k1", "a.pdf");
        let mut manager = AssociationManager::new();
        manager.open_association_modal(&item, &mut UiEvent::new());
        manager.toggle_brain("b1");

        let mut second = UiEvent::new();
        assert!(!manager.open_association_modal(&item, &mut second));
        assert!(!second.propagates());
        assert_eq!(manager.modal().unwrap().selected(), &["b1".to_string()]);
    }

    #[test]
    fn test_close_is_cancel_safe() {
        let item = KMSElement::file("k1", "a.pdf").with_brains(["b1"]);
        let store = store_with(item.clone());
        let mut manager = AssociationManager::new();

        manager.open_association_modal(&item, &mut UiEvent::new());
        manager.toggle_brain("b2");
        manager.close_association_modal();

        assert!(!manager.is_open());
        assert_eq!(store.state().find_item("k1").unwrap().brains, vec!["b1"]);
        assert!(manager.begin_submit().is_none());
    }

    #[test]
    fn test_resolve_target() {
        let manager = AssociationManager::new();
        let with_route = Brain::new("a", "A").with_brain_id("b");
        let plain = Brain::new("a", "A");
        assert_eq!(manager.resolve_target(&with_route), "b");
        assert_eq!(manager.resolve_target(&plain), "a");
    }

    #[test]
    fn test_navigate_uses_studio_path() {
        let nav = RecordingNavigator::new();
        let brains = brains();
        let manager = AssociationManager::with_studio_path("/studio/");
        manager.navigate_to_associated_entity(&brains[1], &nav);
        manager.navigate_to_associated_entity(&brains[0], &nav);
        assert_eq!(nav.visited(), vec!["/studio/support-studio", "/studio/b1"]);
    }

    #[test]
    fn test_badges_follow_status() {
        let brains = brains();
        let processing = KMSElement::file("k1", "a.pdf")
            .with_status(KnowledgeStatus::Processing)
            .with_brains(["b1", "support-studio"]);
        let badges = AssociationManager::badges(&processing, &brains);
        assert_eq!(badges.len(), 2);
        assert!(badges.iter().all(|b| b.indicator == Some(Indicator::Waiting)));
        assert!(badges[0].dimmed());

        let failed = processing.clone().with_status(KnowledgeStatus::Error);
        let badges = AssociationManager::badges(&failed, &brains);
        assert!(badges.iter().all(|b| b.indicator == Some(Indicator::Error)));

        let ready = processing.with_status(KnowledgeStatus::Uploaded);
        let badges = AssociationManager::badges(&ready, &brains);
        assert!(badges.iter().all(|b| b.indicator.is_none()));
    }

    #[test]
    fn test_available_brains_excludes_linked() {
        let brains = brains();
        let item = KMSElement::file("k1", "a.pdf").with_brains(["b1"]);
        let names: Vec<_> = AssociationManager::available_brains(&item, &brains)
            .iter()
            .map(|b| b.name.as_str())
            .collect();
        assert_eq!(names, vec!["Support", "Legal"]);
    }

    #[test]
    fn test_begin_submit_requires_selection() {
        let item = KMSElement::file("k1", "a.pdf");
        let mut manager = AssociationManager::new();
        assert!(manager.begin_submit().is_none());

        manager.open_association_modal(&item, &mut UiEvent::new());
        assert!(manager.begin_submit().is_none());

        manager.toggle_brain("b1");
        let request = manager.begin_submit().unwrap();
        assert_eq!(request.brain_ids, vec!["b1"]);
        // Already submitting
        assert!(manager.begin_submit().is_none());
        assert!(manager.toggle_brain("b1"));
    }

    #[tokio::test]
    async fn test_submit_success_closes_modal() {
        let backend = MemoryBackend::new()
            .with_item(KMSElement::file("k1", "a.pdf"))
            .with_brain(Brain::new("b1", "Research"))
            .with_brain(Brain::new("b3", "Legal"));
        let item = KMSElement::file("k1", "a.pdf");
        let mut store = store_with(item.clone());
        let mut manager = AssociationManager::new();

        manager.open_association_modal(&item, &mut UiEvent::new());
        manager.toggle_brain("b1");
        manager.toggle_brain("b3");
        let outcome = manager.submit(&mut store, &backend).await;

        assert_eq!(outcome, SubmitOutcome::Linked(vec!["b1".into(), "b3".into()]));
        assert!(!manager.is_open());
        assert_eq!(store.state().find_item("k1").unwrap().brains, vec!["b1", "b3"]);
    }

    #[tokio::test]
    async fn test_submit_failure_keeps_modal_and_state() {
        let backend = MemoryBackend::new()
            .with_item(KMSElement::file("k1", "a.pdf"))
            .with_brain(Brain::new("b1", "Research"));
        backend.fail_links_to("b1");
        let item = KMSElement::file("k1", "a.pdf");
        let mut store = store_with(item.clone());
        let commits = store.commit_count();
        let mut manager = AssociationManager::new();

        manager.open_association_modal(&item, &mut UiEvent::new());
        manager.toggle_brain("b1");
        let outcome = manager.submit(&mut store, &backend).await;

        assert_eq!(
            outcome,
            SubmitOutcome::PartiallyFailed {
                linked: vec![],
                failed: vec!["b1".into()]
            }
        );
        let modal = manager.modal().unwrap();
        assert!(!modal.submitting);
        assert!(modal.error.is_some());
        assert_eq!(modal.selected(), &["b1".to_string()]);
        assert!(store.state().find_item("k1").unwrap().brains.is_empty());
        assert_eq!(store.commit_count(), commits);
    }

    #[tokio::test]
    async fn test_partial_failure_applies_confirmed_links_only() {
        let backend = MemoryBackend::new()
            .with_item(KMSElement::file("k1", "a.pdf"))
            .with_brain(Brain::new("b1", "Research"))
            .with_brain(Brain::new("b3", "Legal"));
        backend.fail_links_to("b3");
        let item = KMSElement::file("k1", "a.pdf");
        let mut store = store_with(item.clone());
        let mut manager = AssociationManager::new();

        manager.open_association_modal(&item, &mut UiEvent::new());
        manager.toggle_brain("b1");
        manager.toggle_brain("b3");
        manager.submit(&mut store, &backend).await;

        assert_eq!(store.state().find_item("k1").unwrap().brains, vec!["b1"]);
        assert_eq!(manager.modal().unwrap().selected(), &["b3".to_string()]);
    }

    #[test]
    fn test_late_results_leave_reopened_modal_alone() {
        let item = KMSElement::file("k1", "a.pdf");
        let mut store = store_with(item.clone());
        let mut manager = AssociationManager::new();

        manager.open_association_modal(&item, &mut UiEvent::new());
        manager.toggle_brain("b1");
        let earlier = manager.begin_submit().unwrap();
        manager.close_association_modal();

        manager.open_association_modal(&item, &mut UiEvent::new());
        manager.toggle_brain("b3");

        let outcome = manager.finish_submit(&mut store, &earlier, vec![("b1".into(), Ok(()))]);
        assert_eq!(outcome, SubmitOutcome::Linked(vec!["b1".into()]));
        assert_eq!(store.state().find_item("k1").unwrap().brains, vec!["b1"]);

        let modal = manager.modal().unwrap();
        assert_eq!(modal.selected(), &["b3".to_string()]);
        assert!(!modal.submitting);

        // A failed late write does not overwrite the reopened selection either
        manager.finish_submit(
            &mut store,
            &earlier,
            vec![("b2".into(), Err(crate::ExplorerError::Network("down".into())))],
        );
        let modal = manager.modal().unwrap();
        assert_eq!(modal.selected(), &["b3".to_string()]);
        assert!(modal.error.is_none());

        // The reopened modal's own submission still closes it
        let current = manager.begin_submit().unwrap();
        manager.finish_submit(&mut store, &current, vec![("b3".into(), Ok(()))]);
        assert!(!manager.is_open());
    }

    #[tokio::test]
    async fn test_write_links_issues_one_call_per_brain() {
        let backend = MemoryBackend::new()
            .with_item(KMSElement::file("k1", "a.pdf"))
            .with_brain(Brain::new("b1", "Research"))
            .with_brain(Brain::new("b3", "Legal"));
        backend.fail_links_to("b3");

        let request = LinkRequest::new("k1", vec!["b1".into(), "b3".into()]);
        let results = write_links(&backend, &request).await;

        assert_eq!(backend.link_calls(), 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "b1");
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, "b3");
        assert!(results[1].1.is_err());
    }

    #[test]
    fn test_closed_modal_still_records_confirmed_links() {
        let item = KMSElement::file("k1", "a.pdf");
        let mut store = store_with(item.clone());
        let mut manager = AssociationManager::new();

        manager.open_association_modal(&item, &mut UiEvent::new());
        manager.toggle_brain("b1");
        let request = manager.begin_submit().unwrap();
        manager.close_association_modal();

        let outcome = manager.finish_submit(&mut store, &request, vec![("b1".into(), Ok(()))]);
        assert_eq!(outcome, SubmitOutcome::Linked(vec!["b1".into()]));
        assert_eq!(store.state().find_item("k1").unwrap().brains, vec!["b1"]);
    }
}
