use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use inboxpert::config::{Config, load_config};
use inboxpert::daemon::notifier::DesktopNotifier;
use inboxpert::daemon::{WatchConfig, run_watch};
use inboxpert::feed::FeedClient;
use inboxpert::refresh::{ChannelSink, LogSink, NotificationSink, RefreshController};
use inboxpert::terminal::run_tui;

#[derive(Parser)]
#[command(name = "inboxpert")]
#[command(about = "Email classification dashboard (TUI + watcher)", long_about = None)]
struct Cli {
    /// Override the feed URL from the config file
    #[arg(long, global = true)]
    feed_url: Option<String>,

    /// Override the refresh interval, in seconds
    #[arg(long, global = true)]
    interval: Option<u64>,

    /// Per-request timeout in seconds (none by default)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the interactive dashboard
    Tui,

    /// Refresh on a timer, log every sync and raise desktop notifications
    Watch {
        /// Log only, no desktop notifications
        #[arg(long)]
        quiet: bool,
    },

    /// Fetch once and print records, stats and parse report as JSON
    Snapshot {
        /// Seconds to wait for the fetch
        #[arg(long, default_value_t = 60)]
        wait: u64,
    },
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut cfg = load_config().map_err(|e| anyhow!("Configuration error: {e}"))?;
    if let Some(url) = &cli.feed_url {
        cfg.feed_url = Some(url.clone());
    }
    if let Some(secs) = cli.interval {
        cfg.refresh_interval_secs = Some(secs);
    }
    if let Some(secs) = cli.timeout {
        cfg.request_timeout_secs = Some(secs);
    }
    cfg.validate()?;
    Ok(cfg)
}

fn controller(cfg: &Config, sink: Box<dyn NotificationSink>) -> Result<RefreshController> {
    let client = FeedClient::new(cfg.feed_url(), cfg.request_timeout())?;
    Ok(RefreshController::new(
        Arc::new(client),
        sink,
        cfg.refresh_interval(),
    ))
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let cfg = resolve_config(&cli)?;

    match cli.cmd {
        Command::Tui => {
            let (tx, rx) = mpsc::channel();
            let mut c = controller(&cfg, Box::new(ChannelSink::new(tx)))?;
            run_tui(&mut c, rx)
        }

        Command::Watch { quiet } => {
            let sink: Box<dyn NotificationSink> = if quiet || !cfg.desktop_notifications() {
                Box::new(LogSink)
            } else {
                Box::new(DesktopNotifier::new())
            };
            let mut c = controller(&cfg, sink)?;
            run_watch(&mut c, WatchConfig::default())
        }

        Command::Snapshot { wait } => {
            let mut c = controller(&cfg, Box::new(LogSink))?;
            c.start();
            if !c.settle(Duration::from_secs(wait)) {
                return Err(anyhow!("no response from the feed within {wait}s"));
            }

            let s = c.snapshot();
            if let Some(err) = s.error {
                return Err(anyhow!(err));
            }
            let out = serde_json::json!({
                "records": &*s.records,
                "stats": &*s.stats,
                "report": s.report,
                "lastSynced": s.last_synced,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            Ok(())
        }
    }
}
