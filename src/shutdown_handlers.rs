use tokio_util::sync::CancellationToken;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Cancels `cancel` on Ctrl+C or SIGTERM. The task also ends once the token
/// is cancelled by anyone else.
pub fn setup_signal_shutdown_handler(cancel: &CancellationToken) -> tokio::task::JoinHandle<()> {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(signal) => Some(signal),
            Err(err) => {
                eprintln!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        #[cfg(unix)]
        {
            tokio::select! {
                () = cancel.cancelled() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, stopping run");
                    cancel.cancel();
                }
                () = async {
                    if let Some(signal) = term_signal.as_mut() {
                        signal.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {
                    tracing::info!("SIGTERM received, stopping run");
                    cancel.cancel();
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                () = cancel.cancelled() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received, stopping run");
                    cancel.cancel();
                }
            }
        }
    })
}
