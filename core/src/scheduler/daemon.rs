//! Foreground scheduler loop
//!
//! Ticks once a minute, running every enabled user whose schedule has come
//! due. Users are processed one at a time and each run is awaited to
//! completion before the store is touched again, so two firings for the
//! same user can never race one check-in task.

use crate::checkin::Checkin;
use crate::config::store::ConfigStore;
use crate::config::UserConfig;
use crate::error::PunchError;
use crate::notify::{self, Notifier};
use crate::portal::Portal;
use crate::scheduler::next_run_after;
use anyhow::{Context, Result};
use chrono::{Local, Utc};
use std::fs;
use std::path::PathBuf;
use std::process;
use tokio::time::{sleep, Duration};

const TICK_INTERVAL: Duration = Duration::from_secs(60);

pub struct SchedulerDaemon<N: Notifier> {
    store: ConfigStore,
    notifier: N,
    pid_path: PathBuf,
}

impl<N: Notifier> SchedulerDaemon<N> {
    pub fn new(store: ConfigStore, notifier: N) -> Self {
        let pid_path = store.root_dir().join("daemon.pid");
        Self {
            store,
            notifier,
            pid_path,
        }
    }

    pub async fn start_loop(&self) -> Result<()> {
        self.write_pid()?;
        log::info!("check-in daemon started (PID: {})", process::id());

        loop {
            if let Err(e) = self.tick().await {
                log::error!("daemon tick failed: {e:?}");
            }
            sleep(TICK_INTERVAL).await;
        }
    }

    fn write_pid(&self) -> Result<()> {
        fs::create_dir_all(self.store.root_dir())
            .with_context(|| format!("Failed to create data dir: {:?}", self.store.root_dir()))?;
        fs::write(&self.pid_path, process::id().to_string())
            .with_context(|| format!("Failed to write PID file: {:?}", self.pid_path))
    }

    pub fn cleanup(&self) {
        if self.pid_path.exists() {
            let _ = fs::remove_file(&self.pid_path);
        }
    }

    async fn tick(&self) -> Result<()> {
        let mut file = self.store.load()?;
        let mut changed = false;

        for (user, cfg) in file.users.iter_mut() {
            if !cfg.auto_enabled {
                continue;
            }

            let next = match cfg.next_auto_run_at {
                Some(next) => next,
                None => {
                    // First sight of this user: compute the schedule, don't
                    // fire immediately.
                    match next_run_after(Local::now(), &cfg.auto_time) {
                        Ok(next) => {
                            log::info!("scheduling {user} for {next}");
                            cfg.next_auto_run_at = Some(next.with_timezone(&Utc));
                            changed = true;
                        }
                        Err(e) => log::warn!("cannot schedule {user}: {e}"),
                    }
                    continue;
                }
            };

            if Utc::now() < next {
                continue;
            }

            log::info!("running scheduled check-in for {user}");
            let outcome = self.run_user(cfg).await;

            match &outcome {
                Ok(class_id) if cfg.class_id.is_empty() => {
                    cfg.class_id = class_id.clone();
                }
                Ok(_) => {}
                Err(e) => log::warn!("scheduled check-in failed for {user}: {e:#}"),
            }

            self.notify_outcome(user, cfg, &outcome).await;

            // One attempt per day: a failed run still advances the schedule.
            cfg.last_auto_run_at = Some(Utc::now());
            cfg.next_auto_run_at = match next_run_after(Local::now(), &cfg.auto_time) {
                Ok(next) => Some(next.with_timezone(&Utc)),
                Err(e) => {
                    log::warn!("cannot reschedule {user}: {e}");
                    None
                }
            };
            changed = true;
        }

        if changed {
            self.store.save(&file)?;
        }

        Ok(())
    }

    async fn run_user(&self, cfg: &UserConfig) -> Result<String> {
        cfg.require_complete()?;
        let portal = Portal::new(&cfg.cookie)?;
        let checkin = Checkin::new(&portal);
        let class_id = checkin.run(cfg).await?;
        Ok(class_id)
    }

    async fn notify_outcome(&self, user: &str, cfg: &UserConfig, outcome: &Result<String>) {
        let (success, message) = match outcome {
            Ok(class_id) => (
                true,
                format!("Scheduled check-in succeeded for {user} (class {class_id})"),
            ),
            Err(e) => {
                let detail = match e.downcast_ref::<PunchError>() {
                    Some(p) if p.is_transport() => format!("could not reach the portal: {p}"),
                    _ => format!("{e:#}"),
                };
                (false, format!("Scheduled check-in failed for {user}: {detail}"))
            }
        };
        notify::dispatch(&self.notifier, &cfg.notifications, success, &message).await;
    }
}
