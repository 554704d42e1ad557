use std::sync::Arc;

use cvsync::{CvcrmClient, LogNotifier, Notifier, Store, SyncEngine, db};

use crate::config::Config;
use crate::progress;

pub(crate) type Engine = SyncEngine<CvcrmClient, Store>;

/// Wire a sync engine from configuration.
///
/// `force` disables the operating window for this engine.
pub(crate) async fn build_engine(
    config: &Config,
    database_url: &str,
    force: bool,
) -> Result<Engine, Box<dyn std::error::Error>> {
    let credentials = config.credentials()?;
    let window = config.operating_window(force)?;
    let options = config.sync_options()?;

    let db = Arc::new(db::connect(database_url).await?);
    let client = CvcrmClient::new(&config.api.base_url, credentials, config.fetch_policy())?;

    tracing::debug!(
        base_url = client.base_url(),
        environment = config.environment(),
        window_enforced = window.enforce,
        "Engine configured"
    );

    Ok(SyncEngine::new(Arc::clone(&db), client, Store::new(db))
        .with_notifier(notifier(config)?)
        .with_window(window)
        .with_options(options)
        .with_progress(progress::callback()))
}

#[cfg(feature = "smtp")]
fn notifier(config: &Config) -> Result<Arc<dyn Notifier>, Box<dyn std::error::Error>> {
    match config.smtp_settings() {
        Some(settings) => {
            tracing::info!(host = %settings.host, "E-mail alerts enabled");
            Ok(Arc::new(cvsync::notify::SmtpNotifier::new(&settings)?))
        }
        None => Ok(Arc::new(LogNotifier)),
    }
}

#[cfg(not(feature = "smtp"))]
fn notifier(_config: &Config) -> Result<Arc<dyn Notifier>, Box<dyn std::error::Error>> {
    Ok(Arc::new(LogNotifier))
}
