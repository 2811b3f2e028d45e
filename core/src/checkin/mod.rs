//! The check-in pipeline
//!
//! One linear sequence, no feedback loops: resolve the class, discover the
//! active task, submit coordinates, classify the verdict. Each stage is
//! exposed on its own so the CLI can interleave its class-selection prompt;
//! [`Checkin::run`] strings them together for unattended runs.

pub mod jitter;

use crate::config::UserConfig;
use crate::error::{PunchError, Result};
use crate::portal::{extract, ClassRecord, StudentPortal, Submission};

/// Pipeline driver over any [`StudentPortal`] implementation.
pub struct Checkin<'a, P: StudentPortal> {
    portal: &'a P,
}

impl<'a, P: StudentPortal> Checkin<'a, P> {
    pub fn new(portal: &'a P) -> Self {
        Self { portal }
    }

    /// Fetch the dashboard and extract the enrolled classes.
    pub async fn list_classes(&self) -> Result<Vec<ClassRecord>> {
        let html = self.portal.dashboard().await?;
        let classes = extract::class_list(&html);
        if classes.is_empty() {
            return Err(PunchError::NoClasses);
        }
        log::info!("found {} enrolled class(es)", classes.len());
        Ok(classes)
    }

    /// Fetch the class's task list and take the first active check-in task.
    pub async fn discover_task(&self, class_id: &str) -> Result<String> {
        let html = self.portal.task_list(class_id).await?;
        extract::first_task_id(&html).ok_or_else(|| PunchError::NoTask {
            class_id: class_id.to_string(),
        })
    }

    /// Submit one check-in and classify the verdict.
    pub async fn punch(&self, class_id: &str, task_id: &str, lat: &str, lng: &str) -> Result<()> {
        let submission = Submission {
            class_id: class_id.to_string(),
            task_id: task_id.to_string(),
            lat: lat.to_string(),
            lng: lng.to_string(),
        };
        let body = self.portal.submit(&submission).await?;
        if extract::is_success(&body) {
            Ok(())
        } else {
            Err(PunchError::Rejected)
        }
    }

    /// Task discovery plus submission for an already-resolved class, with
    /// jitter applied to the configured coordinates.
    pub async fn run_pinned(&self, cfg: &UserConfig, class_id: &str) -> Result<()> {
        cfg.require_complete()?;
        let task_id = self.discover_task(class_id).await?;
        log::info!("check-in task {task_id} found for class {class_id}");
        let (lat, lng) = {
            let mut rng = rand::thread_rng();
            (
                jitter::apply_offset(&cfg.lat, cfg.offset, &mut rng),
                jitter::apply_offset(&cfg.lng, cfg.offset, &mut rng),
            )
        };
        self.punch(class_id, &task_id, &lat, &lng).await
    }

    /// The full pipeline for an unattended run: resolve the class (pinned id,
    /// or auto-selection when exactly one class exists), then check in.
    /// Returns the class id that was used so callers can persist it.
    pub async fn run(&self, cfg: &UserConfig) -> Result<String> {
        cfg.require_complete()?;
        let class_id = if cfg.class_id.is_empty() {
            let classes = self.list_classes().await?;
            choose_class(&classes, None)?.id.clone()
        } else {
            cfg.class_id.clone()
        };
        self.run_pinned(cfg, &class_id).await?;
        Ok(class_id)
    }
}

/// Selection policy over an extracted class list.
///
/// Exactly one class is always auto-selected. With several classes, `pick`
/// is the operator's raw 1-based selection: absent input cannot be resolved
/// (no prompt is possible on this path), and non-numeric or out-of-range
/// input is an invalid selection.
pub fn choose_class<'c>(classes: &'c [ClassRecord], pick: Option<&str>) -> Result<&'c ClassRecord> {
    match classes {
        [] => Err(PunchError::NoClasses),
        [only] => Ok(only),
        _ => {
            let input = pick.ok_or(PunchError::AmbiguousClass {
                count: classes.len(),
            })?;
            let ordinal: usize = input
                .trim()
                .parse()
                .map_err(|_| PunchError::InvalidSelection {
                    input: input.to_string(),
                })?;
            if ordinal < 1 || ordinal > classes.len() {
                return Err(PunchError::InvalidSelection {
                    input: input.to_string(),
                });
            }
            Ok(&classes[ordinal - 1])
        }
    }
}
