//! `punchcard` - automated GPS check-in against the k8n.cn student portal
//!
//! Stores a session cookie and coordinates per user, resolves the enrolled
//! class and its active check-in task from the portal's pages, and submits
//! the check-in either on demand (`now`) or on a daily schedule (`daemon`).

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;

use punchcard_core::checkin::{choose_class, Checkin};
use punchcard_core::config::{ConfigStore, NotificationLevel};
use punchcard_core::notify::ConsoleNotifier;
use punchcard_core::portal::Portal;
use punchcard_core::scheduler::{self, SchedulerDaemon};

use crate::cli::{Cli, Commands, SetKey};
use crate::output::OutputFormatter;

mod cli;
mod output;

#[tokio::main]
async fn main() -> Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let formatter = OutputFormatter::new();
    let store = ConfigStore::new().context("failed to locate a data directory")?;

    match cli.command {
        Commands::Now { choose } => {
            handle_now(&store, &cli.user, choose.as_deref(), &formatter).await
        }

        Commands::Set { key, value, target } => handle_set(&store, &cli.user, key, value, &target),

        Commands::Config => {
            let file = store.load()?;
            let cfg = file.users.get(&cli.user).cloned().unwrap_or_default();
            formatter.print_config(&cli.user, &cfg);
            Ok(())
        }

        Commands::Daemon => {
            let daemon = SchedulerDaemon::new(store, ConsoleNotifier);
            tokio::select! {
                result = daemon.start_loop() => result,
                _ = tokio::signal::ctrl_c() => {
                    log::info!("received Ctrl-C, shutting down");
                    daemon.cleanup();
                    Ok(())
                }
            }
        }
    }
}

/// Immediate check-in: validate the configuration, resolve the class
/// (prompting when several are found), discover the task and submit.
async fn handle_now(
    store: &ConfigStore,
    user: &str,
    choose: Option<&str>,
    formatter: &OutputFormatter,
) -> Result<()> {
    let mut file = store.load()?;
    let mut cfg = file.users.get(user).cloned().unwrap_or_default();

    if let Err(e) = cfg.require_complete() {
        bail!("{e}; set it first with `punchcard set <key> <value>`");
    }

    let portal = Portal::new(&cfg.cookie)?;
    let checkin = Checkin::new(&portal);

    if cfg.class_id.is_empty() {
        let classes = checkin.list_classes().await?;
        let record = if classes.len() == 1 {
            choose_class(&classes, None)?
        } else {
            formatter.print_classes(&classes);
            let pick = match choose {
                Some(raw) => raw.to_string(),
                None => Input::<String>::with_theme(&ColorfulTheme::default())
                    .with_prompt(format!("Select a class (1-{})", classes.len()))
                    .interact_text()
                    .context("class selection aborted")?,
            };
            choose_class(&classes, Some(&pick))?
        };
        formatter.print_selected(record);
        cfg.class_id = record.id.clone();
        file.users.insert(user.to_string(), cfg.clone());
        store.save(&file)?;
    }

    match checkin.run_pinned(&cfg, &cfg.class_id).await {
        Ok(()) => {
            formatter.print_success("Check-in succeeded");
            Ok(())
        }
        Err(e) => {
            let message = if e.is_transport() {
                format!("Could not reach the portal: {e}")
            } else {
                format!("Check-in failed: {e}")
            };
            formatter.print_failure(&message);
            std::process::exit(1);
        }
    }
}

fn handle_set(
    store: &ConfigStore,
    user: &str,
    key: SetKey,
    value: Option<String>,
    target: &str,
) -> Result<()> {
    let mut file = store.load()?;
    let cfg = file.users.entry(user.to_string()).or_default();

    match key {
        SetKey::Cookie => {
            cfg.cookie = required(value, "the cookie")?;
            println!("Cookie updated");
        }
        SetKey::Lat => {
            cfg.lat = required(value, "a latitude")?;
            println!("Latitude set to {}", cfg.lat);
        }
        SetKey::Lng => {
            cfg.lng = required(value, "a longitude")?;
            println!("Longitude set to {}", cfg.lng);
        }
        SetKey::ClassId => {
            cfg.class_id = required(value, "a class id")?;
            println!("Class ID set to {}", cfg.class_id);
        }
        SetKey::Offset => {
            let raw = required(value, "an offset")?;
            let offset: f64 = raw
                .parse()
                .with_context(|| format!("{raw:?} is not a number"))?;
            if offset < 0.0 {
                bail!("offset cannot be negative");
            }
            cfg.offset = offset;
            println!("GPS offset set to {offset}");
        }
        SetKey::AutoTime => {
            let raw = required(value, "a time")?;
            scheduler::parse_auto_time(&raw)?;
            cfg.auto_time = raw;
            cfg.next_auto_run_at = None;
            println!("Auto check-in time set to {}", cfg.auto_time);
        }
        SetKey::AutoEnable => {
            let raw = required(value, "enable or disable")?;
            cfg.auto_enabled = parse_toggle(&raw)?;
            cfg.next_auto_run_at = None;
            println!(
                "Auto check-in {}",
                if cfg.auto_enabled { "enabled" } else { "disabled" }
            );
        }
        SetKey::Notification => {
            let raw = required(value, "a notification level")?;
            let level: NotificationLevel = raw.parse().map_err(|e: String| anyhow!(e))?;
            cfg.notifications.insert(target.to_string(), level);
            println!("Notification level for {target} set to {level}");
        }
        SetKey::RemoveNotification => {
            if cfg.notifications.remove(target).is_some() {
                println!("Notification settings removed for {target}");
            } else {
                println!("No notification settings for {target}");
            }
        }
    }

    store.save(&file)?;
    Ok(())
}

fn required(value: Option<String>, what: &str) -> Result<String> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| anyhow!("{what} is required for this key"))
}

fn parse_toggle(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "enable" | "true" | "1" | "yes" | "on" => Ok(true),
        "disable" | "false" | "0" | "no" | "off" => Ok(false),
        other => bail!("expected enable/disable, got {other:?}"),
    }
}
