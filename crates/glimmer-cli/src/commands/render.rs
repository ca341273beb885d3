//! Headless rain-to-PNG render command

use super::session::{Session, SessionArgs};
use anyhow::{Context, Result};
use glimmer_core::Color;
use std::time::Duration;

pub struct RenderArgs {
    pub session: SessionArgs,
    pub output: String,
    pub duration_ms: u64,
    pub background: Option<Color>,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let mut session = Session::start(&args.session)?;

    let dispatched = session
        .host
        .run_until(Duration::from_millis(args.duration_ms), &mut session.rain)
        .context("Rain stopped with an error")?;
    log::debug!("dispatched {dispatched} host event(s)");

    session
        .rain
        .surface()
        .save_png(&args.output, args.background)
        .with_context(|| format!("Failed to write {}", args.output))?;

    let stats = session.rain.stats();
    println!(
        "Rendered {} frame(s) over {}ms: {} live particle(s)",
        stats.frames,
        args.duration_ms,
        session.rain.store().len()
    );
    println!("Saved: {}", args.output);

    session.rain.teardown();
    Ok(())
}
