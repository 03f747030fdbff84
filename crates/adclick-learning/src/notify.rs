//! Success notification boundary.
//!
//! After a successful run the [`SelectionResult`] is rendered into a
//! [`NotificationMessage`] and handed to a [`Notifier`]. Notification is an
//! explicit capability ([`NotificationConfig::enabled`]) and its failures
//! are isolated: [`notify`] never returns an error, it reports a
//! [`NotificationOutcome`] instead, so a delivery problem cannot invalidate
//! an artifact that was already written.
//!
//! Two notifiers ship with the crate:
//!
//! - [`LogNotifier`] writes the message to the log
//! - [`OutboxNotifier`] writes each message as a JSON file into a directory,
//!   for a separate process to deliver

use crate::config::NotificationConfig;
use crate::error::{LearningError, Result};
use crate::types::{DatasetContext, SelectionResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Stages listed in the message body, in execution order.
const COMPLETED_STAGES: [&str; 6] = [
    "Data Loading",
    "Data Summary & Validation",
    "Data Preprocessing",
    "Model Training (3 algorithms)",
    "Model Comparison & Selection",
    "Model Saved Successfully",
];

/// A rendered success message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub sender: String,
    pub recipients: Vec<String>,
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

impl NotificationMessage {
    /// Render the success message for a finished run.
    pub fn from_result(
        result: &SelectionResult,
        dataset: &DatasetContext,
        config: &NotificationConfig,
    ) -> Self {
        let subject = format!(
            "Success: {} - Ad Click Prediction Model Ready",
            config.pipeline_name
        );

        let scores: String = result
            .all_scores
            .iter()
            .map(|score| format!("  - {}: {}\n", score.name, percent(score.accuracy)))
            .collect();
        let stages: String = COMPLETED_STAGES
            .iter()
            .enumerate()
            .map(|(i, stage)| format!("  {}. {}\n", i + 1, stage))
            .collect();

        let body = format!(
            "Hi Team,\n\n\
             The Ad Click Prediction pipeline has completed successfully!\n\n\
             MODEL COMPARISON RESULTS:\n\
             {scores}\n\
             BEST MODEL SELECTED:\n\
             \x20 - Algorithm: {}\n\
             \x20 - Accuracy: {}\n\
             \x20 - Trained: {}\n\
             \x20 - Artifact: {}\n\n\
             DATASET INFO:\n\
             \x20 - Name: {}\n\
             \x20 - Samples: {}\n\
             \x20 - Task: {}\n\n\
             PIPELINE STAGES COMPLETED:\n\
             {stages}\n\
             Best regards,\nMLOps Bot\n",
            result.best_model_name,
            percent(result.accuracy),
            result.trained_at,
            result.artifact_path.display(),
            dataset.name,
            dataset.samples,
            dataset.task,
        );

        Self {
            sender: config.sender.clone(),
            recipients: config.recipients.clone(),
            subject,
            body,
        }
    }
}

fn percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Delivers notification messages.
pub trait Notifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Deliver one message.
    ///
    /// # Errors
    ///
    /// [`LearningError::NotificationFailed`] or an I/O error when delivery
    /// fails.
    fn dispatch(&self, message: &NotificationMessage) -> Result<()>;
}

/// Writes messages to the log at `info`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    fn dispatch(&self, message: &NotificationMessage) -> Result<()> {
        info!(
            "Notification to {}: {}\n{}",
            message.recipients.join(", "),
            message.subject,
            message.body
        );
        Ok(())
    }
}

/// Writes every message as a pretty JSON file into a directory.
#[derive(Debug, Clone)]
pub struct OutboxNotifier {
    dir: PathBuf,
}

impl OutboxNotifier {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Notifier for OutboxNotifier {
    fn name(&self) -> &str {
        "outbox"
    }

    fn dispatch(&self, message: &NotificationMessage) -> Result<()> {
        fs::create_dir_all(&self.dir)?;

        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S-%6f");
        let path = self.dir.join(format!("notification-{stamp}.json"));
        if path.exists() {
            return Err(LearningError::NotificationFailed(format!(
                "outbox entry {} already exists",
                path.display()
            )));
        }

        fs::write(&path, serde_json::to_string_pretty(message)?)?;
        debug!("Notification written to {}", path.display());
        Ok(())
    }
}

/// What happened to a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum NotificationOutcome {
    Sent,
    /// Notification is disabled.
    Skipped,
    /// Delivery failed; the run itself still succeeded.
    Failed(String),
}

impl NotificationOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, NotificationOutcome::Sent)
    }
}

/// Render and deliver the success message for `result`.
///
/// Returns [`NotificationOutcome::Skipped`] when notification is disabled
/// and [`NotificationOutcome::Failed`] when delivery fails. Never returns
/// an error.
pub fn notify(
    notifier: Option<&dyn Notifier>,
    config: &NotificationConfig,
    result: &SelectionResult,
    dataset: &DatasetContext,
) -> NotificationOutcome {
    if !config.enabled {
        debug!("Notification disabled, skipping");
        return NotificationOutcome::Skipped;
    }

    let Some(notifier) = notifier else {
        warn!("Notification enabled but no notifier configured");
        return NotificationOutcome::Failed("no notifier configured".to_string());
    };

    let message = NotificationMessage::from_result(result, dataset, config);
    match notifier.dispatch(&message) {
        Ok(()) => {
            info!(
                "Success notification sent via {} to {}",
                notifier.name(),
                message.recipients.join(", ")
            );
            NotificationOutcome::Sent
        }
        Err(e) => {
            warn!("Notification via {} failed: {}", notifier.name(), e);
            NotificationOutcome::Failed(e.to_string())
        }
    }
}
