//! WASM-compatible egui visualization for OntoSight datasets.
//!
//! This crate provides an egui-based visualization that can run:
//! - Natively (via eframe)
//! - In the browser (via WASM)
//!
//! The layers, bottom-up:
//! - [`store`]: observable selection/highlight/view-mode state
//! - [`scene`]: visual descriptors derived from a dataset and the store
//! - [`engine`]: the rendering engine seam and its event sink
//! - [`adapter`]: engine lifecycle (build, patch, rebuild, destroy)
//! - [`session`] and [`details`]: data fetching around the store
//! - [`app`]: the eframe application wiring it all to [`egui_engine`]

pub mod adapter;
pub mod app;
pub mod backend;
pub mod details;
pub mod egui_engine;
pub mod engine;
mod render;
pub mod sample;
pub mod scene;
pub mod session;
pub mod settings;
pub mod store;

pub use adapter::{AdapterState, PatchOutcome, RenderAdapter, SyncAction};
pub use app::{OntoSightApp, CANVAS_ID};
pub use backend::{Backend, BackendError, BackendResult, LocalBackend};
pub use details::{DetailCache, DetailFetch, DetailSource, DetailStatus};
pub use egui_engine::{EguiEngine, EguiEngineFactory};
pub use engine::{
    EngineError, EngineEvent, EngineFactory, EventSink, Generation, Handler, MountTarget,
    RenderEngine,
};
pub use scene::{ItemCard, Scene, StatePatch};
pub use session::{LoadStatus, ViewSession};
pub use store::{SelectionStore, StoreEvent, SubscriptionId, ViewMode};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::{prelude::*, JsCast};

/// Start the visualization app in WASM context.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    // Better panic messages in the browser console
    console_error_panic_hook::set_once();

    let web_options = eframe::WebOptions::default();

    let Some(canvas) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id(CANVAS_ID))
        .and_then(|e| e.dyn_into::<web_sys::HtmlCanvasElement>().ok())
    else {
        web_sys::console::error_1(&format!("No canvas with id `{CANVAS_ID}`").into());
        return;
    };

    wasm_bindgen_futures::spawn_local(async move {
        let started = eframe::WebRunner::new()
            .start(
                canvas,
                web_options,
                Box::new(|cc| Ok(Box::new(OntoSightApp::new(cc)))),
            )
            .await;
        if let Err(err) = started {
            web_sys::console::error_1(&format!("Failed to start eframe: {err:?}").into());
        }
    });
}
