//! Rendering adapter: the one place that drives the engine lifecycle.
//!
//! ```text
//! Uninitialized -> Building -> Ready -> (Patching | Rebuilding) -> Ready ... -> Destroyed
//! ```
//!
//! - A new dataset reference, or a bump of the store's reset counter,
//!   rebuilds the engine from scratch with node coordinates stripped.
//! - A selection/highlight change on the same dataset is pushed as a state
//!   patch.
//! - No patch reaches the engine before its first render has completed; an
//!   early patch is deferred and flushed on the transition to `Ready`.
//! - Engine failures are logged and leave the view mounted but empty
//!   (`Faulted`). A later dataset change may build again.

use std::collections::HashMap;
use std::rc::Rc;

use ontosight_core::{hit_test, Dataset, ElementId, ElementKind, VisualState};
use tracing::{debug, error, info};

use crate::engine::{
    EngineError, EngineEvent, EngineFactory, EventQueue, EventSink, Generation, Handler,
    MountTarget, RenderEngine,
};
use crate::scene::{state_patch, Scene};
use crate::store::SelectionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Uninitialized,
    Building,
    Ready,
    Patching,
    Rebuilding,
    Destroyed,
    /// Construction or rendering failed; nothing is mounted.
    Faulted,
}

/// What a call to [`RenderAdapter::sync`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Idle,
    Built,
    Rebuilt,
    Patched(PatchOutcome),
    Failed,
    Destroyed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The engine received this many state changes.
    Applied(usize),
    /// Nothing differed from what the engine already shows.
    Unchanged,
    /// The engine is not ready; the patch will run once it is.
    Deferred,
    /// The adapter has no engine to patch.
    Rejected,
}

pub struct RenderAdapter<F: EngineFactory> {
    factory: F,
    mount: MountTarget,
    state: AdapterState,
    engine: Option<F::Engine>,
    sink: Option<EventSink>,
    queue: EventQueue,
    generation: Generation,
    /// Dataset reference last handed to `sync`.
    source: Option<Rc<Dataset>>,
    /// Copy actually rendered (coordinates stripped on rebuild).
    rendered: Option<Dataset>,
    seen_reset: u64,
    seen_revision: u64,
    states: HashMap<ElementId, VisualState>,
    pending_patch: bool,
    rebuilds: u64,
}

impl<F: EngineFactory> RenderAdapter<F> {
    pub fn new(factory: F, mount: MountTarget) -> Self {
        Self {
            factory,
            mount,
            state: AdapterState::Uninitialized,
            engine: None,
            sink: None,
            queue: EventQueue::default(),
            generation: 0,
            source: None,
            rendered: None,
            seen_reset: 0,
            seen_revision: 0,
            states: HashMap::new(),
            pending_patch: false,
            rebuilds: 0,
        }
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == AdapterState::Ready
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn mount(&self) -> &MountTarget {
        &self.mount
    }

    pub fn engine(&self) -> Option<&F::Engine> {
        self.engine.as_ref()
    }

    pub fn engine_mut(&mut self) -> Option<&mut F::Engine> {
        self.engine.as_mut()
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    /// The dataset as rendered by the current engine.
    pub fn rendered(&self) -> Option<&Dataset> {
        self.rendered.as_ref()
    }

    // =========================================================================
    // Synchronization
    // =========================================================================

    /// Bring the engine in line with `dataset` and the store.
    pub fn sync(&mut self, dataset: &Rc<Dataset>, store: &SelectionStore) -> SyncAction {
        let same_dataset = self
            .source
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, dataset));

        let state = self.state;
        match state {
            AdapterState::Destroyed => SyncAction::Destroyed,
            // A reset requested before mounting still starts cold.
            AdapterState::Uninitialized => {
                self.build(dataset, store, store.reset_counter() > 0)
            }
            _ if !same_dataset => self.build(dataset, store, true),
            _ if store.reset_counter() != self.seen_reset => {
                debug!(counter = store.reset_counter(), "Layout reset requested");
                self.build(dataset, store, true)
            }
            AdapterState::Faulted => SyncAction::Idle,
            _ if store.revision() != self.seen_revision => {
                SyncAction::Patched(self.patch_state(store))
            }
            _ => SyncAction::Idle,
        }
    }

    /// Push the store's current visual states to the engine.
    ///
    /// Never reaches the engine before it is ready.
    pub fn patch_state(&mut self, store: &SelectionStore) -> PatchOutcome {
        match self.state {
            AdapterState::Ready => {}
            AdapterState::Building | AdapterState::Rebuilding => {
                debug!(state = ?self.state, "Deferring state patch until render completes");
                self.pending_patch = true;
                return PatchOutcome::Deferred;
            }
            _ => return PatchOutcome::Rejected,
        }
        let (Some(engine), Some(dataset)) = (self.engine.as_mut(), self.rendered.as_ref()) else {
            return PatchOutcome::Rejected;
        };

        self.state = AdapterState::Patching;
        self.seen_revision = store.revision();
        let (patch, next) = state_patch(dataset, store, &self.states);
        if patch.is_empty() {
            self.state = AdapterState::Ready;
            return PatchOutcome::Unchanged;
        }

        let count = patch.changes.len();
        match engine.apply_states(&patch) {
            Ok(()) => {
                self.states = next;
                self.state = AdapterState::Ready;
                PatchOutcome::Applied(count)
            }
            Err(err) => {
                self.fault(err);
                PatchOutcome::Rejected
            }
        }
    }

    fn build(&mut self, dataset: &Rc<Dataset>, store: &SelectionStore, cold: bool) -> SyncAction {
        let rebuilding = self.engine.is_some();
        self.teardown();

        self.state = if rebuilding {
            AdapterState::Rebuilding
        } else {
            AdapterState::Building
        };
        self.generation += 1;
        self.source = Some(Rc::clone(dataset));
        self.seen_reset = store.reset_counter();
        self.seen_revision = store.revision();
        self.pending_patch = false;

        let rendered = if cold {
            dataset.without_positions()
        } else {
            Dataset::clone(dataset)
        };

        let sink = EventSink::new(self.generation, Rc::clone(&self.queue));
        for handler in Handler::ALL {
            sink.register(handler);
        }

        let mut engine = match self.factory.create(&self.mount, sink.clone()) {
            Ok(engine) => engine,
            Err(err) => {
                sink.close();
                self.fault(err);
                return SyncAction::Failed;
            }
        };

        let scene = Scene::build(&rendered, store);
        if let Err(err) = engine.render(&scene) {
            sink.close();
            engine.destroy();
            self.fault(err);
            return SyncAction::Failed;
        }

        info!(
            generation = self.generation,
            nodes = scene.nodes.len(),
            edges = scene.edges.len(),
            regions = scene.regions.len(),
            cold,
            "Engine built"
        );

        self.states = scene.states();
        self.rendered = Some(rendered);
        self.engine = Some(engine);
        self.sink = Some(sink);

        if rebuilding {
            self.rebuilds += 1;
            SyncAction::Rebuilt
        } else {
            SyncAction::Built
        }
    }

    fn fault(&mut self, err: EngineError) {
        error!(generation = self.generation, error = %err, "Rendering engine failed");
        self.teardown();
        self.state = AdapterState::Faulted;
    }

    /// Unregister handlers and destroy the current engine, if any.
    fn teardown(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.close();
        }
        if let Some(mut engine) = self.engine.take() {
            engine.destroy();
        }
        self.rendered = None;
        self.states.clear();
        self.pending_patch = false;
        self.queue.borrow_mut().clear();
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Drain queued engine events, applying clicks to the store.
    ///
    /// Returns the number of events acted on.
    pub fn pump(&mut self, store: &mut SelectionStore) -> usize {
        let events: Vec<_> = self.queue.borrow_mut().drain(..).collect();
        let mut handled = 0;
        for (generation, event) in events {
            if self.handle_event(generation, event, store) {
                handled += 1;
            }
        }
        handled
    }

    fn handle_event(
        &mut self,
        generation: Generation,
        event: EngineEvent,
        store: &mut SelectionStore,
    ) -> bool {
        let live = self.sink.as_ref().is_some_and(EventSink::is_live);
        if generation != self.generation || !live {
            debug!(
                generation,
                current = self.generation,
                ?event,
                "Ignoring stale engine event"
            );
            return false;
        }

        match event {
            EngineEvent::RenderComplete => {
                if !matches!(
                    self.state,
                    AdapterState::Building | AdapterState::Rebuilding
                ) {
                    return false;
                }
                self.state = AdapterState::Ready;
                debug!(generation, "Engine ready");
                if std::mem::take(&mut self.pending_patch) || store.revision() != self.seen_revision
                {
                    self.patch_state(store);
                }
                true
            }
            EngineEvent::Resized { width, height } => {
                self.mount.width = width;
                self.mount.height = height;
                if let Some(engine) = self.engine.as_mut() {
                    engine.resize(width, height);
                }
                true
            }
            EngineEvent::NodeClicked(id) => self.select(store, id, ElementKind::Node),
            EngineEvent::EdgeClicked(id) => self.select(store, id, ElementKind::Edge),
            EngineEvent::RegionClicked { tag, members } => {
                let hyperedges = self
                    .rendered
                    .as_ref()
                    .map(|d| d.hyperedges())
                    .unwrap_or_default();
                match hit_test(hyperedges, tag.as_deref(), &members) {
                    Some(id) => self.select(store, id, ElementKind::Hyperedge),
                    None => false,
                }
            }
            EngineEvent::CanvasClicked => {
                store.clear_selection();
                true
            }
        }
    }

    fn select(&self, store: &mut SelectionStore, id: ElementId, kind: ElementKind) -> bool {
        let known = self
            .rendered
            .as_ref()
            .is_some_and(|d| d.contains(id.as_str()));
        if known {
            store.select_item(id, kind);
        }
        known
    }

    // =========================================================================
    // Teardown
    // =========================================================================

    /// Unregister all handlers and destroy the engine. Safe to call repeatedly.
    pub fn destroy(&mut self) {
        if self.state == AdapterState::Destroyed {
            return;
        }
        self.teardown();
        self.source = None;
        self.state = AdapterState::Destroyed;
        info!(generation = self.generation, "Engine destroyed");
    }
}

impl<F: EngineFactory> Drop for RenderAdapter<F> {
    fn drop(&mut self) {
        self.destroy();
    }
}
