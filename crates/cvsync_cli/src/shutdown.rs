use console::Term;

/// Wait for Ctrl+C, then arm a second Ctrl+C to force quit.
///
/// Returns once shutdown has been requested, so the caller can stop the
/// scheduler while an in-flight pass finishes its current page.
pub(crate) async fn wait_for_shutdown() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        return;
    }

    let is_tty = Term::stdout().is_term();
    if is_tty {
        eprintln!("\n\nShutdown requested, stopping the scheduler...");
        eprintln!("Press Ctrl+C again to force quit.");
    } else {
        tracing::warn!("Shutdown requested, stopping the scheduler");
    }

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            if is_tty {
                eprintln!("Force quit!");
            }
            std::process::exit(130);
        }
    });
}
