//! Rendering engine seam.
//!
//! An engine owns its own element model and layout. It talks back to the
//! adapter only through an [`EventSink`], which is bound to one engine
//! construction (its generation) and stops accepting events once closed.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

use ontosight_core::ElementId;
use thiserror::Error;
use tracing::debug;

use crate::scene::{Scene, StatePatch};

/// Counter identifying one engine construction.
pub type Generation = u64;

/// Interaction and lifecycle notifications emitted by an engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    NodeClicked(ElementId),
    EdgeClicked(ElementId),
    /// A hyperedge region was clicked. `tag` is the region's id tag if the
    /// engine kept it.
    RegionClicked {
        tag: Option<String>,
        members: Vec<ElementId>,
    },
    CanvasClicked,
    Resized {
        width: f32,
        height: f32,
    },
    /// The render requested last has been painted.
    RenderComplete,
}

impl EngineEvent {
    fn handler(&self) -> Handler {
        match self {
            EngineEvent::NodeClicked(_) => Handler::NodeClick,
            EngineEvent::EdgeClicked(_) => Handler::EdgeClick,
            EngineEvent::RegionClicked { .. } => Handler::RegionClick,
            EngineEvent::CanvasClicked => Handler::CanvasClick,
            EngineEvent::Resized { .. } => Handler::Resize,
            EngineEvent::RenderComplete => Handler::RenderComplete,
        }
    }
}

/// Listener slots an engine can deliver to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handler {
    NodeClick,
    EdgeClick,
    RegionClick,
    CanvasClick,
    Resize,
    RenderComplete,
}

impl Handler {
    pub const ALL: [Handler; 6] = [
        Handler::NodeClick,
        Handler::EdgeClick,
        Handler::RegionClick,
        Handler::CanvasClick,
        Handler::Resize,
        Handler::RenderComplete,
    ];
}

pub(crate) type EventQueue = Rc<RefCell<VecDeque<(Generation, EngineEvent)>>>;

#[derive(Debug, Default)]
struct SinkState {
    live: bool,
    handlers: HashSet<Handler>,
}

/// Event channel from one engine instance to the adapter.
#[derive(Debug, Clone)]
pub struct EventSink {
    generation: Generation,
    queue: EventQueue,
    state: Rc<RefCell<SinkState>>,
}

impl EventSink {
    pub(crate) fn new(generation: Generation, queue: EventQueue) -> Self {
        Self {
            generation,
            queue,
            state: Rc::new(RefCell::new(SinkState {
                live: true,
                handlers: HashSet::new(),
            })),
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn is_live(&self) -> bool {
        self.state.borrow().live
    }

    pub(crate) fn register(&self, handler: Handler) {
        self.state.borrow_mut().handlers.insert(handler);
    }

    pub fn is_registered(&self, handler: Handler) -> bool {
        let state = self.state.borrow();
        state.live && state.handlers.contains(&handler)
    }

    /// Unregister every handler and refuse further events.
    pub(crate) fn close(&self) {
        let mut state = self.state.borrow_mut();
        state.live = false;
        state.handlers.clear();
    }

    /// Queue an event for the adapter. Returns false if it was dropped.
    pub fn emit(&self, event: EngineEvent) -> bool {
        if !self.is_registered(event.handler()) {
            debug!(
                generation = self.generation,
                ?event,
                "Dropping event from closed or unregistered sink"
            );
            return false;
        }
        self.queue.borrow_mut().push_back((self.generation, event));
        true
    }
}

/// Box the engine is mounted into.
#[derive(Debug, Clone, PartialEq)]
pub struct MountTarget {
    pub id: String,
    pub width: f32,
    pub height: f32,
}

impl MountTarget {
    pub fn new(id: impl Into<String>, width: f32, height: f32) -> Self {
        Self {
            id: id.into(),
            width,
            height,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to construct engine on {mount}: {message}")]
    Construction { mount: String, message: String },

    #[error("Render failed: {0}")]
    Render(String),

    #[error("State patch failed: {0}")]
    Patch(String),
}

/// Imperative rendering engine driven by the adapter.
pub trait RenderEngine {
    /// Replace the engine's content with `scene` and lay it out. Completion
    /// is signalled asynchronously through [`EngineEvent::RenderComplete`].
    fn render(&mut self, scene: &Scene) -> Result<(), EngineError>;

    /// Restyle elements without touching layout.
    fn apply_states(&mut self, patch: &StatePatch) -> Result<(), EngineError>;

    fn resize(&mut self, width: f32, height: f32);

    /// Release engine resources. Called at most once per instance.
    fn destroy(&mut self);
}

/// Constructs engines against a mount target.
pub trait EngineFactory {
    type Engine: RenderEngine;

    fn create(&mut self, mount: &MountTarget, sink: EventSink) -> Result<Self::Engine, EngineError>;
}
