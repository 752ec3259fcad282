/*
[INPUT]:  TaskTracker with running poll loops, OS shutdown signals
[OUTPUT]: Live table on a terminal, final table and exit code
[POS]:    CLI layer - watch loop shared by submit and watch
[UPDATE]: When changing live rendering or exit code rules
*/

use console::{Term, style};
use megaweb_tracker::{PollOutcome, SharedTable, TaskTracker};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Wait for every tracked task, redrawing the table while they run.
///
/// Exits with failure unless every task ended in SUCCESS.
pub async fn watch_until_done(tracker: &mut TaskTracker) -> ExitCode {
    setup_signal_handlers(tracker.shutdown_token());

    let table = tracker.table();
    let render_done = CancellationToken::new();
    let renderer = tokio::spawn(render_live(table.clone(), render_done.clone()));

    let outcomes = tracker.wait_all().await;
    render_done.cancel();
    if let Err(err) = renderer.await {
        debug!(error = %err, "renderer task ended abnormally");
    }

    let styled = console::colors_enabled();
    print!("{}", table.lock().await.render(styled));

    let mut all_succeeded = true;
    for (handle, outcome) in &outcomes {
        if outcome.is_success() {
            continue;
        }
        all_succeeded = false;
        let label = match outcome {
            PollOutcome::Terminal(_) => style(outcome.label()).red(),
            _ => style(outcome.label()).yellow(),
        };
        eprintln!("{handle}: {label}");
    }

    info!(tasks = outcomes.len(), all_succeeded, "watch finished");
    if all_succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Redraw the table in place on every change. Off a terminal nothing is
/// drawn until the final table.
async fn render_live(table: SharedTable, done: CancellationToken) {
    let term = Term::stdout();
    if !term.is_term() {
        done.cancelled().await;
        return;
    }

    let mut changes = table.lock().await.subscribe();
    let mut drawn_lines = 0;
    loop {
        tokio::select! {
            _ = done.cancelled() => break,
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        let rendered = table.lock().await.render(true);
        if let Err(err) = term
            .clear_last_lines(drawn_lines)
            .and_then(|_| term.write_str(&rendered))
        {
            debug!(error = %err, "terminal redraw failed");
            break;
        }
        drawn_lines = rendered.lines().count();
    }

    if let Err(err) = term.clear_last_lines(drawn_lines) {
        debug!(error = %err, "terminal clear failed");
    }
}

fn setup_signal_handlers(shutdown: CancellationToken) {
    let shutdown_clone = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        shutdown_clone.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let shutdown_clone = shutdown.clone();
        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown_clone.cancel();
                }
                Err(err) => {
                    warn!(error = %err, "failed to install SIGTERM handler");
                }
            }
        });
    }
}
