//! # Icon Listing
//!
//! Feeds a name → markup map of icons through a headless pipeline and
//! prints every result as it arrives.
//!
//! ```text
//! [icon map] → worker(name, contents) → output.subscribe(print)
//! ```
//!
//! Run: `cargo run --example 01_icon_listing`

use headless::prelude::*;
use std::collections::BTreeMap;

fn icon_set() -> BTreeMap<&'static str, &'static str> {
    BTreeMap::from([
        ("activity", "<polyline points=\"22 12 18 12 15 21 9 3 6 12 2 12\"/>"),
        ("arrow-up", "<line x1=\"12\" y1=\"19\" x2=\"12\" y2=\"5\"/><polyline points=\"5 12 12 5 19 12\"/>"),
        ("check", "<polyline points=\"20 6 9 17 4 12\"/>"),
        ("circle", "<circle cx=\"12\" cy=\"12\" r=\"10\"/>"),
        ("minus", "<line x1=\"5\" y1=\"12\" x2=\"19\" y2=\"12\"/>"),
        ("x", "<line x1=\"18\" y1=\"6\" x2=\"6\" y2=\"18\"/><line x1=\"6\" y1=\"6\" x2=\"18\" y2=\"18\"/>"),
    ])
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();
    headless::observability::init_metrics();

    let handle = headless::worker(icon_set(), Identity)?;
    handle
        .ports()
        .output()
        .subscribe(|event| println!("{event}"))?;

    let summary = handle.wait().await?;
    println!(
        "\n{} icons processed ({} failed)",
        summary.succeeded + summary.failed,
        summary.failed
    );
    Ok(())
}
