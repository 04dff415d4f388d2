use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::Parser;
use notify_rust::Notification;
use showup_core::ScheduledReminder;
use showup_core::config::ShowUpConfig;
use showup_core::dispatch::FileDispatcher;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "showup-notify")]
#[command(about = "Show desktop notifications for confirmed showup events")]
struct Cli {
    /// Deliver whatever is due and exit
    #[arg(long)]
    once: bool,

    /// Longest time to sleep between checks, in seconds
    #[arg(long, default_value_t = 60)]
    poll_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();

    let config = ShowUpConfig::load()?;
    let dispatcher = FileDispatcher::new(&config.data_path());
    let poll = Duration::from_secs(cli.poll_secs.max(1));

    info!(store = %dispatcher.path().display(), "Watching for reminders");

    loop {
        let wait = tick(&dispatcher, Utc::now(), poll, show_notification).await;

        if cli.once {
            return Ok(());
        }

        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}

/// One pass of the service loop: deliver what is due and decide how long to
/// sleep. Store errors are logged and retried after `poll`.
async fn tick<F>(dispatcher: &FileDispatcher, now: DateTime<Utc>, poll: Duration, show: F) -> Duration
where
    F: Fn(&ScheduledReminder) -> Result<()>,
{
    match deliver_due(dispatcher, now, show).await {
        Ok(0) => {}
        Ok(delivered) => info!(count = delivered, "Delivered reminders"),
        Err(e) => {
            warn!(store = %dispatcher.path().display(), error = %e, "Could not read pending reminders");
            return poll;
        }
    }

    match dispatcher.next_fire_at().await {
        Ok(next) => {
            let wait = next_wait(Utc::now(), next, poll);
            debug!(?next, wait_secs = wait.as_secs(), "Sleeping");
            wait
        }
        Err(e) => {
            warn!(store = %dispatcher.path().display(), error = %e, "Could not read pending reminders");
            poll
        }
    }
}

/// Pop every reminder due at `now` and hand it to `show`.
///
/// A reminder that fails to show is logged and dropped; it has already been
/// removed from the store.
async fn deliver_due<F>(dispatcher: &FileDispatcher, now: DateTime<Utc>, show: F) -> Result<usize>
where
    F: Fn(&ScheduledReminder) -> Result<()>,
{
    let due = dispatcher.take_due(now).await?;
    let mut delivered = 0;

    for reminder in &due {
        match show(reminder) {
            Ok(()) => {
                debug!(id = %reminder.id, kind = %reminder.kind, "Reminder shown");
                delivered += 1;
            }
            Err(e) => warn!(id = %reminder.id, error = %e, "Failed to show reminder"),
        }
    }

    Ok(delivered)
}

/// How long to sleep before the next check: until the next fire time, but
/// never longer than `poll` so reminders scheduled meanwhile are picked up.
fn next_wait(now: DateTime<Utc>, next: Option<DateTime<Utc>>, poll: Duration) -> Duration {
    match next {
        Some(at) => (at - now).to_std().unwrap_or(Duration::ZERO).min(poll),
        None => poll,
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
const VIEW_ACTION: &str = "view";

/// Show the reminder with a "View Event" action that opens its link.
///
/// The notification is shown and watched on its own thread so waiting for a
/// click never holds up the loop.
#[cfg(all(unix, not(target_os = "macos")))]
fn show_notification(reminder: &ScheduledReminder) -> Result<()> {
    let payload = reminder.payload.clone();
    let (shown_tx, shown_rx) = std::sync::mpsc::channel();

    std::thread::spawn(move || {
        let shown = Notification::new()
            .summary(&payload.title)
            .body(&payload.body)
            .appname("showup")
            .action(VIEW_ACTION, "View Event")
            .show();

        let handle = match shown {
            Ok(handle) => {
                let _ = shown_tx.send(Ok(()));
                handle
            }
            Err(e) => {
                let _ = shown_tx.send(Err(e.to_string()));
                return;
            }
        };

        handle.wait_for_action(|action| {
            if action == VIEW_ACTION {
                open_event(&payload.user_info.event_url);
            }
        });
    });

    match shown_rx.recv()? {
        Ok(()) => Ok(()),
        Err(e) => anyhow::bail!("{}", e),
    }
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn show_notification(reminder: &ScheduledReminder) -> Result<()> {
    Notification::new()
        .summary(&reminder.payload.title)
        .body(&reminder.payload.body)
        .appname("showup")
        .show()?;
    Ok(())
}

#[cfg(all(unix, not(target_os = "macos")))]
fn open_event(url: &str) {
    if let Err(e) = open::that(url) {
        warn!(url, error = %e, "Could not open event link");
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("showup_notify=info,showup_core=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
