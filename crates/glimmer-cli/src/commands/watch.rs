//! Run the rain against the wall clock and print live counts

use super::session::{Session, SessionArgs};
use anyhow::{Context, Result};
use std::time::Duration;

pub struct WatchArgs {
    pub session: SessionArgs,
    pub seconds: u64,
}

pub fn run(args: WatchArgs) -> Result<()> {
    let mut session = Session::start(&args.session)?;
    println!(
        "Raining on a {}x{} surface for {}s (Ctrl+C to stop)",
        args.session.width, args.session.height, args.seconds
    );

    for second in 1..=args.seconds {
        session
            .host
            .run_realtime(Duration::from_secs(1), &mut session.rain)
            .context("Rain stopped with an error")?;
        let stats = session.rain.stats();
        println!(
            "[{second:>3}s] live={:<5} frames={:<6} spawned={:<6} evicted={}",
            session.rain.store().len(),
            stats.frames,
            stats.spawned,
            stats.evicted
        );
    }

    session.rain.teardown();
    Ok(())
}
