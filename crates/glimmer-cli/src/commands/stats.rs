//! Run the rain on virtual time and report counters

use super::session::{Session, SessionArgs};
use anyhow::{bail, Context, Result};
use glimmer_particles::{RainConfig, RainStats};
use serde::Serialize;
use std::time::Duration;

pub struct StatsArgs {
    pub session: SessionArgs,
    pub duration_ms: u64,
    pub format: String,
}

#[derive(Serialize)]
struct Report {
    duration_ms: u64,
    width: u32,
    height: u32,
    live: usize,
    #[serde(flatten)]
    stats: RainStats,
}

pub fn run(args: StatsArgs) -> Result<()> {
    if args.format != "text" && args.format != "json" {
        bail!("unknown format '{}'; valid values: text, json", args.format);
    }

    let mut session = Session::start(&args.session)?;
    session
        .host
        .run_until(Duration::from_millis(args.duration_ms), &mut session.rain)
        .context("Rain stopped with an error")?;

    let report = Report {
        duration_ms: args.duration_ms,
        width: args.session.width,
        height: args.session.height,
        live: session.rain.store().len(),
        stats: session.rain.stats(),
    };
    session.rain.teardown();

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print!("{}", text_report(&report, &session.config));
    Ok(())
}

fn text_report(report: &Report, config: &RainConfig) -> String {
    let palette: Vec<String> = config
        .spawner
        .palette
        .iter()
        .map(|c| c.to_hex_string())
        .collect();
    let s = &report.stats;
    let mut out = String::new();
    out += &format!("Duration:      {}ms\n", report.duration_ms);
    out += &format!("Surface:       {}x{}\n", report.width, report.height);
    out += &format!("Spawn every:   {}ms\n", config.spawn_interval_ms);
    out += &format!("Frame rate:    {}Hz\n", config.refresh_hz);
    out += &format!("Palette:       {}\n", palette.join(" "));
    out += &format!("Frames:        {}\n", s.frames);
    out += &format!("Spawn events:  {}\n", s.spawn_events);
    out += &format!("Spawned:       {}\n", s.spawned);
    out += &format!("Dropped (cap): {}\n", s.dropped);
    out += &format!("Evicted:       {}\n", s.evicted);
    out += &format!("Resizes:       {}\n", s.resizes);
    out += &format!("Live:          {}\n", report.live);
    out
}
