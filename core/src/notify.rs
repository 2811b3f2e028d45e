//! Outcome notification dispatch
//!
//! Each user carries a map of notification targets to levels; after a
//! scheduled run, every target whose level admits the outcome gets one
//! message. Delivery is behind the [`Notifier`] trait so hosts can plug in
//! their own transport.

use crate::config::NotificationLevel;
use async_trait::async_trait;
use std::collections::BTreeMap;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, target: &str, message: &str) -> anyhow::Result<()>;
}

/// Writes notifications to stdout; the default sink for CLI runs.
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, target: &str, message: &str) -> anyhow::Result<()> {
        println!("[{target}] {message}");
        Ok(())
    }
}

/// Send `message` to every target whose level admits this outcome.
pub async fn dispatch<N: Notifier>(
    notifier: &N,
    targets: &BTreeMap<String, NotificationLevel>,
    success: bool,
    message: &str,
) {
    for (target, level) in targets {
        if !level.should_notify(success) {
            continue;
        }
        match notifier.notify(target, message).await {
            Ok(()) => log::info!("notified {target} ({level})"),
            Err(e) => log::error!("failed to notify {target}: {e:#}"),
        }
    }
}
