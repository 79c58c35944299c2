//! TUI application state
//!
//! Owns the explorer core and wires it to the collaborators. Fetches and link
//! writes run on the tokio runtime and report back over a channel that the
//! draw loop drains with [`App::poll_results`].

use crate::api::Services;
use crate::explorer::{
    write_links, ApplyOutcome, AssociationManager, ExplorerDispatcher, ExplorerView,
    FolderNavigator, GenerationCounter, KnowledgeStore, LinkRequest, NavFetch, RootFetch,
    RootSelector, SubmitOutcome, UiEvent,
};
use crate::knowledge::{Brain, KMSElement, ProviderRef};
use crate::Result;
use ratatui::widgets::ListState;
use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::mpsc;
use tokio::runtime::Handle;

/// Which pane receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Quivr root and connected providers
    Sources,
    /// Contents of the current folder
    Listing,
    /// "Add to brains" modal of [`App::modal_item`]
    Modal,
}

/// Results coming back from background work
pub enum BackgroundResult {
    Root(RootFetch, Result<Vec<KMSElement>>),
    Nav(NavFetch, Result<Vec<KMSElement>>),
    Links(LinkRequest, Vec<(String, Result<()>)>),
    Brains(Result<Vec<Brain>>),
    Providers(Result<Vec<ProviderRef>>),
}

pub struct App {
    pub store: KnowledgeStore,
    pub dispatcher: ExplorerDispatcher,
    pub root_selector: RootSelector,
    pub navigator: FolderNavigator,
    /// One association manager per knowledge row of the current listing
    pub associations: HashMap<String, AssociationManager>,
    /// Row whose "add to brains" modal is open; independent of the cursor
    pub modal_item: Option<String>,
    pub brains: Vec<Brain>,
    pub providers: Vec<ProviderRef>,
    pub focus: Focus,
    /// 0 is the Quivr root, 1.. are providers
    pub source_index: usize,
    pub list_state: ListState,
    pub modal_index: usize,
    pub status_message: Option<String>,
    /// Background jobs in flight
    pub in_flight: usize,
    needs_redraw: Rc<Cell<bool>>,
    services: Services,
    runtime: Handle,
    studio_path: String,
    result_tx: mpsc::Sender<BackgroundResult>,
    result_rx: mpsc::Receiver<BackgroundResult>,
}

impl App {
    pub fn new(services: Services, runtime: Handle, studio_path: impl Into<String>) -> Self {
        let mut store = KnowledgeStore::new();
        let needs_redraw = Rc::new(Cell::new(true));
        let flag = Rc::clone(&needs_redraw);
        store.subscribe(move |_| flag.set(true));

        let generation = GenerationCounter::new();
        let (result_tx, result_rx) = mpsc::channel();
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            store,
            dispatcher: ExplorerDispatcher::new(),
            root_selector: RootSelector::with_generation(generation.clone()),
            navigator: FolderNavigator::with_generation(generation),
            associations: HashMap::new(),
            modal_item: None,
            brains: Vec::new(),
            providers: Vec::new(),
            focus: Focus::Listing,
            source_index: 0,
            list_state,
            modal_index: 0,
            status_message: None,
            in_flight: 0,
            needs_redraw,
            services,
            runtime,
            studio_path: studio_path.into(),
            result_tx,
            result_rx,
        }
    }

    /// Mount the explorer: mark the root as explored and load everything
    /// the first screen needs
    pub fn start(&mut self) {
        self.dispatcher.mount(&mut self.store);
        let fetch = self.root_selector.mount();
        self.spawn_root_fetch(fetch);
        self.load_directories();
    }

    /// Whether the screen must be redrawn; clears the flag
    pub fn take_redraw(&mut self) -> bool {
        self.needs_redraw.replace(false)
    }

    pub fn request_redraw(&self) {
        self.needs_redraw.set(true);
    }

    pub fn view(&self) -> ExplorerView {
        self.dispatcher.current_view(&self.store)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn listing(&self) -> &[KMSElement] {
        &self.store.state().listing
    }

    pub fn selected_item(&self) -> Option<&KMSElement> {
        self.list_state.selected().and_then(|i| self.listing().get(i))
    }

    /// Association manager of a row, created on first use
    pub fn association(&mut self, item_id: &str) -> &mut AssociationManager {
        let studio_path = &self.studio_path;
        self.associations
            .entry(item_id.to_string())
            .or_insert_with(|| AssociationManager::with_studio_path(studio_path.as_str()))
    }

    fn modal_element(&self) -> Option<&KMSElement> {
        self.modal_item
            .as_deref()
            .and_then(|id| self.store.state().find_item(id))
    }

    /// Manager whose modal is open, if any
    pub fn open_modal(&self) -> Option<(&KMSElement, &AssociationManager)> {
        let item = self.modal_element()?;
        let manager = self.associations.get(&item.id)?;
        manager.is_open().then_some((item, manager))
    }

    /// Brains the open modal offers
    pub fn modal_brains(&self) -> Vec<&Brain> {
        match self.modal_element() {
            Some(item) => AssociationManager::available_brains(item, &self.brains),
            None => Vec::new(),
        }
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.request_redraw();
    }

    pub fn clear_status(&mut self) {
        if self.status_message.take().is_some() {
            self.request_redraw();
        }
    }

    // --- Background work ---

    fn spawn_root_fetch(&mut self, fetch: RootFetch) {
        let api = self.services.knowledge.clone();
        let tx = self.result_tx.clone();
        self.in_flight += 1;
        self.runtime.spawn(async move {
            let result = api.list_folder(None).await;
            let _ = tx.send(BackgroundResult::Root(fetch, result));
        });
    }

    fn spawn_nav_fetch(&mut self, fetch: NavFetch) {
        let api = self.services.knowledge.clone();
        let tx = self.result_tx.clone();
        self.in_flight += 1;
        self.runtime.spawn(async move {
            let result = fetch.target.fetch(&*api).await;
            let _ = tx.send(BackgroundResult::Nav(fetch, result));
        });
    }

    fn load_directories(&mut self) {
        let brains = self.services.brains.clone();
        let providers = self.services.providers.clone();
        let tx = self.result_tx.clone();
        self.in_flight += 2;
        self.runtime.spawn(async move {
            let _ = tx.send(BackgroundResult::Brains(brains.list_brains().await));
            let _ = tx.send(BackgroundResult::Providers(providers.list_providers().await));
        });
    }

    /// Apply every result that has arrived
    pub fn poll_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.request_redraw();
            self.handle_result(result);
        }
    }

    fn handle_result(&mut self, result: BackgroundResult) {
        match result {
            BackgroundResult::Root(fetch, result) => {
                match self.root_selector.apply(&mut self.store, fetch, result) {
                    ApplyOutcome::Applied => {
                        self.navigator.reset_trail();
                        self.listing_replaced();
                    }
                    ApplyOutcome::Failed => self.set_status("Failed to get files"),
                    ApplyOutcome::Stale => {}
                }
            }
            BackgroundResult::Nav(fetch, result) => {
                match self.navigator.apply(&mut self.store, fetch, result) {
                    ApplyOutcome::Applied => self.listing_replaced(),
                    ApplyOutcome::Failed => self.set_status("Failed to list folder"),
                    ApplyOutcome::Stale => {}
                }
            }
            BackgroundResult::Links(request, results) => {
                let studio_path = self.studio_path.clone();
                let manager = self
                    .associations
                    .entry(request.item_id.clone())
                    .or_insert_with(|| AssociationManager::with_studio_path(studio_path));
                let outcome = manager.finish_submit(&mut self.store, &request, results);
                let modal_closed = !manager.is_open();
                if modal_closed && self.modal_item.as_deref() == Some(request.item_id.as_str()) {
                    self.modal_item = None;
                    if self.focus == Focus::Modal {
                        self.focus = Focus::Listing;
                    }
                }
                if modal_closed && self.store.state().find_item(&request.item_id).is_none() {
                    self.associations.remove(&request.item_id);
                }
                match outcome {
                    SubmitOutcome::Linked(linked) => {
                        self.set_status(format!("Linked to {} brain(s)", linked.len()));
                    }
                    SubmitOutcome::PartiallyFailed { failed, .. } => {
                        self.set_status(format!("{} link(s) failed, press Enter to retry", failed.len()));
                    }
                    SubmitOutcome::Idle => {}
                }
            }
            BackgroundResult::Brains(Ok(brains)) => self.brains = brains,
            BackgroundResult::Providers(Ok(providers)) => self.providers = providers,
            BackgroundResult::Brains(Err(e)) => {
                tracing::error!(error = %e, "Failed to list brains");
                self.set_status("Failed to list brains");
            }
            BackgroundResult::Providers(Err(e)) => {
                tracing::error!(error = %e, "Failed to list providers");
                self.set_status("Failed to list providers");
            }
        }
    }

    /// A fetch replaced the listing: drop state of rows that are gone and
    /// keep the open modal only if its row is still listed
    fn listing_replaced(&mut self) {
        let listing = &self.store.state().listing;
        self.associations
            .retain(|id, _| listing.iter().any(|item| &item.id == id));

        let modal_row = self
            .modal_item
            .as_deref()
            .and_then(|id| listing.iter().position(|item| item.id == id));
        match modal_row {
            Some(row) => self.list_state.select(Some(row)),
            None => {
                if self.modal_item.take().is_some() && self.focus == Focus::Modal {
                    self.focus = Focus::Listing;
                }
                let selected = if listing.is_empty() { None } else { Some(0) };
                self.list_state.select(selected);
            }
        }
    }

    // --- Sources pane ---

    pub fn source_count(&self) -> usize {
        1 + self.providers.len()
    }

    pub fn next_source(&mut self) {
        self.source_index = (self.source_index + 1) % self.source_count();
    }

    pub fn previous_source(&mut self) {
        self.source_index = match self.source_index {
            0 => self.source_count() - 1,
            i => i - 1,
        };
    }

    /// Enter on a source: toggle the Quivr root or open a provider
    pub fn activate_source(&mut self) {
        self.clear_status();
        if self.source_index == 0 {
            let fetch = self.root_selector.activate();
            self.spawn_root_fetch(fetch);
        } else if let Some(provider) = self.providers.get(self.source_index - 1).cloned() {
            let fetch = self.navigator.open_provider(provider);
            self.spawn_nav_fetch(fetch);
        }
        self.focus = Focus::Listing;
    }

    // --- Listing pane ---

    pub fn next(&mut self) {
        let len = self.listing().len();
        if len > 0 {
            let i = self.list_state.selected().map_or(0, |i| (i + 1) % len);
            self.list_state.select(Some(i));
        }
    }

    pub fn previous(&mut self) {
        let len = self.listing().len();
        if len > 0 {
            let i = match self.list_state.selected() {
                Some(0) | None => len - 1,
                Some(i) => i - 1,
            };
            self.list_state.select(Some(i));
        }
    }

    /// Enter on a row: open folders, ignore files
    pub fn open_selected(&mut self) {
        let Some(folder) = self.selected_item().and_then(|item| item.as_folder_ref()) else {
            return;
        };
        self.clear_status();
        let fetch = self.navigator.open_folder(self.store.state(), folder);
        self.spawn_nav_fetch(fetch);
    }

    pub fn go_up(&mut self) {
        if let Some(fetch) = self.navigator.go_up(self.store.state()) {
            self.spawn_nav_fetch(fetch);
        }
    }

    pub fn refresh(&mut self) {
        let fetch = self.navigator.refresh(self.store.state());
        self.spawn_nav_fetch(fetch);
    }

    /// Navigate to the first brain the selected item is linked to
    pub fn go_to_connected_brain(&mut self) {
        let Some(item) = self.selected_item() else {
            return;
        };
        let connected: Option<Brain> = AssociationManager::connected_brains(item, &self.brains)
            .first()
            .map(|b| (*b).clone());
        let Some(brain) = connected else {
            self.set_status("Not linked to any brain");
            return;
        };
        let item_id = item.id.clone();
        let navigator = self.services.navigator.clone();
        let manager = self.association(&item_id);
        manager.navigate_to_associated_entity(&brain, navigator.as_ref());
        let path = manager.studio_path_for(&brain);
        self.set_status(format!("Opened {}", path));
    }

    // --- Association modal ---

    pub fn open_association_modal(&mut self) {
        let Some(item) = self.selected_item().cloned() else {
            return;
        };
        if let Some(previous) = self.modal_item.take() {
            if previous != item.id {
                self.association(&previous).close_association_modal();
            }
        }
        let mut event = UiEvent::new();
        if self.association(&item.id).open_association_modal(&item, &mut event) {
            self.modal_index = 0;
        }
        if self.association(&item.id).is_open() {
            self.modal_item = Some(item.id);
            self.focus = Focus::Modal;
        }
        self.request_redraw();
    }

    pub fn close_association_modal(&mut self) {
        if let Some(item_id) = self.modal_item.take() {
            self.association(&item_id).close_association_modal();
        }
        self.focus = Focus::Listing;
        self.request_redraw();
    }

    pub fn modal_next(&mut self) {
        let len = self.modal_brains().len();
        if len > 0 {
            self.modal_index = (self.modal_index + 1) % len;
        }
    }

    pub fn modal_previous(&mut self) {
        let len = self.modal_brains().len();
        if len > 0 {
            self.modal_index = if self.modal_index == 0 { len - 1 } else { self.modal_index - 1 };
        }
    }

    pub fn modal_toggle(&mut self) {
        let Some(brain_id) = self.modal_brains().get(self.modal_index).map(|b| b.id.clone()) else {
            return;
        };
        if let Some(item_id) = self.modal_item.clone() {
            self.association(&item_id).toggle_brain(&brain_id);
        }
    }

    pub fn modal_submit(&mut self) {
        let Some(item_id) = self.modal_item.clone() else {
            return;
        };
        let Some(request) = self.association(&item_id).begin_submit() else {
            return;
        };
        let api = self.services.associations.clone();
        let tx = self.result_tx.clone();
        self.in_flight += 1;
        self.runtime.spawn(async move {
            let results = write_links(&*api, &request).await;
            let _ = tx.send(BackgroundResult::Links(request, results));
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MemoryBackend, RecordingNavigator};
    use crate::explorer::ExplorerView;
    use crate::knowledge::FolderRef;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn app(backend: Arc<MemoryBackend>, navigator: Arc<RecordingNavigator>) -> (App, tokio::runtime::Runtime) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let services = Services::from_backend(backend, navigator);
        let app = App::new(services, runtime.handle().clone(), "/studio");
        (app, runtime)
    }

    fn settle(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.is_loading() && Instant::now() < deadline {
            app.poll_results();
            std::thread::sleep(Duration::from_millis(5));
        }
        app.poll_results();
    }

    #[test]
    fn test_start_loads_root_brains_and_providers() {
        let (mut app, _rt) = app(Arc::new(MemoryBackend::demo()), Arc::new(RecordingNavigator::new()));
        app.start();
        settle(&mut app);

        assert_eq!(app.view(), ExplorerView::ViewingInternalRoot);
        assert!(app.store.state().quivr_root_selected);
        assert_eq!(app.brains.len(), 3);
        assert_eq!(app.providers.len(), 2);
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn test_provider_source_switches_view() {
        let (mut app, _rt) = app(Arc::new(MemoryBackend::demo()), Arc::new(RecordingNavigator::new()));
        app.start();
        settle(&mut app);

        app.next_source();
        app.activate_source();
        settle(&mut app);

        assert_eq!(app.view(), ExplorerView::ViewingExternalProvider);
        assert!(!app.store.state().quivr_root_selected);

        // Back to the root via the Quivr selector
        app.source_index = 0;
        app.activate_source();
        settle(&mut app);
        assert_eq!(app.view(), ExplorerView::ViewingInternalRoot);
    }

    #[test]
    fn test_failed_root_fetch_sets_status() {
        let backend = Arc::new(MemoryBackend::demo());
        backend.set_fail_listings(true);
        let (mut app, _rt) = app(backend, Arc::new(RecordingNavigator::new()));
        app.start();
        settle(&mut app);

        assert_eq!(app.status_message.as_deref(), Some("Failed to get files"));
        assert!(app.listing().is_empty());
        assert!(!app.store.state().quivr_root_selected);
    }

    #[test]
    fn test_modal_links_selected_brain() {
        let backend = Arc::new(MemoryBackend::demo());
        let (mut app, _rt) = app(backend.clone(), Arc::new(RecordingNavigator::new()));
        app.start();
        settle(&mut app);

        let index = app.listing().iter().position(|i| i.id == "k-paper").unwrap();
        app.list_state.select(Some(index));
        app.open_association_modal();
        assert_eq!(app.focus, Focus::Modal);

        // brain-1 is already linked, so the modal offers brain-2 first
        app.modal_toggle();
        app.modal_submit();
        settle(&mut app);

        let item = app.store.state().find_item("k-paper").unwrap();
        assert!(item.is_linked_to("brain-2"));
        assert!(backend.item("k-paper").unwrap().is_linked_to("brain-2"));
        assert_eq!(app.focus, Focus::Listing);
        assert!(app.open_modal().is_none());
    }

    #[test]
    fn test_modal_follows_its_row_across_refresh() {
        let (mut app, _rt) = app(Arc::new(MemoryBackend::demo()), Arc::new(RecordingNavigator::new()));
        app.start();
        settle(&mut app);

        let index = app.listing().iter().position(|i| i.id == "k-paper").unwrap();
        app.list_state.select(Some(index));
        app.refresh();
        app.open_association_modal();
        settle(&mut app);

        assert_eq!(app.focus, Focus::Modal);
        assert_eq!(app.selected_item().map(|i| i.id.as_str()), Some("k-paper"));
        let (item, _) = app.open_modal().unwrap();
        assert_eq!(item.id, "k-paper");

        // Keys still reach the k-paper modal even if the cursor moved
        app.list_state.select(Some(0));
        app.modal_toggle();
        assert_eq!(app.associations["k-paper"].modal().unwrap().selected(), &["brain-2".to_string()]);

        app.close_association_modal();
        assert_eq!(app.focus, Focus::Listing);
        assert!(!app.associations["k-paper"].is_open());
        assert!(app.modal_item.is_none());
    }

    #[test]
    fn test_leaving_folder_closes_modal_and_prunes_rows() {
        let (mut app, _rt) = app(Arc::new(MemoryBackend::demo()), Arc::new(RecordingNavigator::new()));
        app.start();
        settle(&mut app);

        app.association("k-faq");
        let index = app.listing().iter().position(|i| i.id == "k-paper").unwrap();
        app.list_state.select(Some(index));
        app.open_association_modal();
        assert_eq!(app.focus, Focus::Modal);

        let fetch = app
            .navigator
            .open_folder(app.store.state(), FolderRef::new("folder-reports", "Reports"));
        app.spawn_nav_fetch(fetch);
        settle(&mut app);

        assert_eq!(app.focus, Focus::Listing);
        assert!(app.modal_item.is_none());
        assert!(app.open_modal().is_none());
        assert!(app.associations.is_empty());
        assert_eq!(app.list_state.selected(), Some(0));
    }

    #[test]
    fn test_go_to_connected_brain_uses_route_id() {
        let navigator = Arc::new(RecordingNavigator::new());
        let (mut app, _rt) = app(Arc::new(MemoryBackend::demo()), navigator.clone());
        app.start();
        settle(&mut app);

        let index = app.listing().iter().position(|i| i.id == "k-faq").unwrap();
        app.list_state.select(Some(index));
        app.go_to_connected_brain();

        assert_eq!(navigator.visited(), vec!["/studio/support-studio"]);
    }
}
