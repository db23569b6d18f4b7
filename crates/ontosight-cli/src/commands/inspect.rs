//! Inspect command implementation.
//!
//! Prints what a document contains, as the API would report it.

use anyhow::Result;
use ontosight_core::{DataService, ElementId, ElementKind, VizKind};

/// Entity kinds listable for a visualization kind.
fn listable(kind: VizKind) -> &'static [ElementKind] {
    match kind {
        VizKind::Graph => &[ElementKind::Node, ElementKind::Edge],
        VizKind::Hypergraph => &[ElementKind::Node, ElementKind::Hyperedge],
        VizKind::List => &[ElementKind::Item],
    }
}

/// Print a summary of the service's dataset.
pub fn summary(service: &DataService, json: bool) -> Result<()> {
    let meta = service.meta();
    if json {
        println!("{}", serde_json::to_string_pretty(&meta)?);
        return Ok(());
    }

    println!("📊 OntoSight Dataset");
    println!("{:─<50}", "");
    println!("🔍 Type:       {}", meta.kind);
    for (key, value) in &meta.stats {
        println!("   {:<18} {}", key, value);
    }
    println!(
        "🧭 Features:   search={} chat={}",
        meta.features.search, meta.features.chat
    );

    for &entity in listable(meta.kind) {
        let page = service.paginated(entity.plural(), 0, None)?;
        println!();
        println!("📦 {} ({})", entity.plural(), page.total);
        for entry in &page.items {
            println!("   • {:<16} {}", entry.id.as_str(), entry.label);
        }
        if page.has_next {
            println!("   … {} more", page.total - page.items.len());
        }
    }

    Ok(())
}

/// Print the full record of one element as JSON.
pub fn details(service: &DataService, id: &str) -> Result<()> {
    let element = service.details(id)?;
    println!("{}", serde_json::to_string_pretty(&element)?);
    Ok(())
}

/// Print the default sample, or the neighbourhood of `ids`, as JSON.
pub fn sample(service: &DataService, ids: &[String]) -> Result<()> {
    let ids: Vec<ElementId> = ids.iter().map(|id| ElementId::from(id.as_str())).collect();
    let dataset = service.data(&ids, None, None);
    println!("{}", serde_json::to_string_pretty(&dataset)?);
    Ok(())
}
