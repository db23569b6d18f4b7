//! Native egui visualization command.
//!
//! Launches a desktop window over a document, or the sample hypergraph.

use std::path::Path;

use anyhow::Result;
use eframe::{run_native, NativeOptions};
use ontosight_viz::{sample::create_sample_document, OntoSightApp};

use super::{build_service, load_document};
use crate::config::Config;

/// Execute the view command.
pub fn execute(config: &Config, path: Option<&Path>) -> Result<()> {
    let (document, title) = match path {
        Some(path) => (load_document(path)?, path.display().to_string()),
        None => {
            println!("📊 No document given, showing the sample hypergraph");
            (create_sample_document(), "sample".to_string())
        }
    };
    let service = build_service(config, document, true)?;

    println!("🖼️  Launching native visualization...");
    println!("   Tab toggles the side panel");
    println!();

    let options = NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title(format!("OntoSight - {title}")),
        ..Default::default()
    };

    run_native(
        "OntoSight",
        options,
        Box::new(move |cc| Ok(Box::new(OntoSightApp::from_service(cc, service)))),
    )
    .map_err(|e| anyhow::anyhow!("Visualization error: {}", e))?;

    Ok(())
}
