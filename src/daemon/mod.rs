pub mod notifier;

use anyhow::Result;
use std::{
    sync::Arc,
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::{Duration, Instant},
};

use crate::refresh::{Phase, RefreshController};

pub struct WatchConfig {
    /// How often the loop wakes to drive the controller.
    pub poll_every: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            poll_every: Duration::from_millis(250),
        }
    }
}

/// Headless refresh loop: runs until Ctrl-C, logging every applied cycle.
pub fn run_watch(controller: &mut RefreshController, cfg: WatchConfig) -> Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let r2 = running.clone();
    ctrlc::set_handler(move || {
        r2.store(false, Ordering::SeqCst);
    })?;

    log::info!(
        "watching feed every {}s (Ctrl-C to stop)",
        controller.interval().as_secs()
    );
    controller.start_timer();

    while running.load(Ordering::SeqCst) {
        if controller.tick(Instant::now()) {
            report(controller);
        }
        thread::sleep(cfg.poll_every);
    }

    controller.stop();
    log::info!(
        "stopped; {} stale result(s) discarded",
        controller.superseded_count()
    );
    Ok(())
}

fn report(controller: &RefreshController) {
    let s = controller.state();
    match s.phase() {
        Phase::Ready => {
            let cats: Vec<String> = s
                .stats
                .categories
                .iter()
                .map(|(label, n)| format!("{label}={n}"))
                .collect();
            println!(
                "total={} labeled={} unlabeled={} [{}]",
                s.stats.total,
                s.stats.labeled,
                s.stats.unlabeled,
                cats.join(", ")
            );
        }
        Phase::Errored => {
            eprintln!(
                "sync failed: {} (keeping {} records)",
                s.error.as_deref().unwrap_or("unknown error"),
                s.records.len()
            );
        }
        Phase::Idle | Phase::Loading => {}
    }
}
