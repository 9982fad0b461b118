use color_eyre::Result;
use tracing::Level;
use tracing_appender::non_blocking;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber to log to stdout
///
/// Events are written through a non-blocking writer so request handlers never wait on the
/// terminal. The returned [`WorkerGuard`] must be kept alive for the duration of the program to
/// ensure buffered logs are flushed on shutdown.
pub fn init_tracing() -> Result<WorkerGuard> {
    let (non_blocking, guard) = non_blocking(std::io::stdout());

    // By default, the subscriber logs all events with a level of `INFO` or higher, but this can
    // be changed by setting the `RUST_LOG` environment variable.
    let env_filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .try_init()
        .map_err(|e| color_eyre::eyre::eyre!("failed to install tracing subscriber: {}", e))?;

    Ok(guard)
}
