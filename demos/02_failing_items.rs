//! # Failing Items
//!
//! A transform that rejects malformed markup. Failed items arrive as
//! tagged errors next to the successful results; the batch still runs to
//! completion.
//!
//! Run: `cargo run --example 02_failing_items`

use headless::prelude::*;

#[derive(Debug, thiserror::Error)]
#[error("'{0}' is not self-closing markup")]
struct NotSelfClosing(String);

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let runtime = tokio::runtime::Runtime::new()?;

    let validate = FnTransform::new(|_: &str, payload: &str| {
        if payload.trim_end().ends_with("/>") {
            Ok(payload.len())
        } else {
            Err(NotSelfClosing(payload.to_string()))
        }
    });

    let factory = Headless::with_config(
        validate,
        WorkerConfig::sequential()
            .with_name("icons")
            .with_runtime(runtime.handle().clone()),
    );

    let handle = factory.worker([
        ("check", "<polyline points=\"20 6 9 17 4 12\"/>"),
        ("broken", "<circle cx=\"12\""),
        ("minus", "<line x1=\"5\" y1=\"12\" x2=\"19\" y2=\"12\"/>"),
    ])?;

    handle.ports().output().subscribe(|event| match event {
        PortEvent::Result(result) => println!("ok    {} ({} bytes)", result.name, result.value),
        PortEvent::Error(err) => println!("error {}", err),
        PortEvent::Done => println!("done"),
    })?;

    let summary = runtime.block_on(handle.wait())?;
    println!("{summary:?}");
    Ok(())
}
