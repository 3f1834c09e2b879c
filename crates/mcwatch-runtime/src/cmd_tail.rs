//! `mcwatch tail` — follow a server log and print classified events.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use mcwatch_source_log::{FsLogFile, LogEventSource};

use crate::cli::TailOpts;
use crate::output::render_event;

pub async fn cmd_tail(opts: TailOpts) -> anyhow::Result<()> {
    let patterns = opts.patterns.build()?;
    let source = LogEventSource::new(FsLogFile::new(&opts.path), patterns)
        .with_poll_interval(Duration::from_millis(opts.poll_interval_ms.max(1)));

    // Serialize writes from listeners so lines never interleave.
    let stdout = Arc::new(Mutex::new(std::io::stdout()));
    for channel in opts.selected_channels() {
        let stdout = Arc::clone(&stdout);
        let format = opts.format;
        source.on(channel, move |event| {
            use std::io::Write;

            let line = render_event(event, format)?;
            let mut out = stdout.lock().map_err(|_| "stdout lock poisoned")?;
            writeln!(out, "{line}")?;
            out.flush()?;
            Ok(())
        });
    }

    source.start()?;
    wait_for_shutdown().await;
    source.shutdown().await;
    Ok(())
}

async fn wait_for_shutdown() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
                    _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                tracing::warn!("failed to register SIGTERM handler: {e}");
                ctrl_c.await.ok();
                tracing::info!("received ctrl-c, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        tracing::info!("received ctrl-c, shutting down");
    }
}
