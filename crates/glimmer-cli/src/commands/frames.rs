//! Write a PNG sequence of rendered frames

use super::session::{Session, SessionArgs};
use anyhow::{Context, Result};
use glimmer_core::Color;
use std::path::Path;
use std::time::Duration;

pub struct FramesArgs {
    pub session: SessionArgs,
    pub dir: String,
    pub duration_ms: u64,
    pub every: u64,
    pub background: Option<Color>,
}

pub fn run(args: FramesArgs) -> Result<()> {
    let dir = Path::new(&args.dir);
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let mut session = Session::start(&args.session)?;
    let until = Duration::from_millis(args.duration_ms);
    let every = args.every.max(1);
    let mut last_frame = 0;
    let mut written = 0;

    while let Some(event) = session.host.poll(until) {
        session.rain.handle_event(&session.host, &event);

        let frame = session.rain.stats().frames;
        if frame != last_frame && frame % every == 0 {
            let path = dir.join(format!("frame_{frame:05}.png"));
            session
                .rain
                .surface()
                .save_png(&path, args.background)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written += 1;
        }
        last_frame = frame;
    }

    session.rain.teardown();
    println!("Wrote {written} frame(s) to {}", dir.display());
    Ok(())
}
