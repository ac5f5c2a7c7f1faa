//! Notification collaborator: best-effort "run changed" and "checklist completed" signals.

use std::{error::Error, sync::Arc};

use futures::{FutureExt, future::BoxFuture};
use thiserror::Error;
use tracing::{info, warn};

use crate::{dto::run::RunSummary, error::CollaboratorError};

/// Failure reported by a notifier backend.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The request could not be delivered.
    #[error("notification request failed: {0}")]
    Request(#[source] Box<dyn Error + Send + Sync>),
    /// The receiving endpoint rejected the notification.
    #[error("notification endpoint answered with status {0}")]
    Status(u16),
}

/// Outbound signals consumed by social / overlay integrations.
pub trait Notifier: Send + Sync {
    /// The current run changed.
    fn run_changed(&self, run: RunSummary) -> BoxFuture<'static, Result<(), NotifyError>>;
    /// Every checklist item is done.
    fn checklist_completed(&self) -> BoxFuture<'static, Result<(), NotifyError>>;
}

/// A signal to deliver in the background.
#[derive(Debug, Clone)]
pub enum Notification {
    /// The current run changed.
    RunChanged(RunSummary),
    /// Every checklist item is done.
    ChecklistCompleted,
}

impl Notification {
    fn name(&self) -> &'static str {
        match self {
            Notification::RunChanged(_) => "runChanged",
            Notification::ChecklistCompleted => "checklistCompleted",
        }
    }
}

/// Fire-and-forget delivery; failures are logged and never reach the caller.
pub fn notify_in_background(notifier: Arc<dyn Notifier>, notification: Notification) {
    let name = notification.name();
    let delivery = match notification {
        Notification::RunChanged(run) => notifier.run_changed(run),
        Notification::ChecklistCompleted => notifier.checklist_completed(),
    };
    tokio::spawn(async move {
        if let Err(err) = delivery.await {
            warn!(
                collaborator = "notifier",
                notification = name,
                error = %CollaboratorError::from(err),
                "notification failed"
            );
        }
    });
}

/// Notifier that only writes the signals to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn run_changed(&self, run: RunSummary) -> BoxFuture<'static, Result<(), NotifyError>> {
        info!(run = run.id, game = %run.game_info.game_name, "run changed");
        async { Ok(()) }.boxed()
    }

    fn checklist_completed(&self) -> BoxFuture<'static, Result<(), NotifyError>> {
        info!("checklist completed");
        async { Ok(()) }.boxed()
    }
}

#[cfg(feature = "webhook-notifier")]
pub use self::webhook::WebhookNotifier;

#[cfg(feature = "webhook-notifier")]
mod webhook {
    use futures::{FutureExt, future::BoxFuture};
    use serde_json::{Value, json};

    use super::{NotifyError, Notifier};
    use crate::dto::run::RunSummary;

    /// Posts each signal as JSON to a configured URL.
    #[derive(Debug, Clone)]
    pub struct WebhookNotifier {
        client: reqwest::Client,
        url: String,
    }

    impl WebhookNotifier {
        /// Notifier posting to `url`.
        pub fn new(url: impl Into<String>) -> Self {
            Self {
                client: reqwest::Client::new(),
                url: url.into(),
            }
        }

        fn post(&self, body: Value) -> BoxFuture<'static, Result<(), NotifyError>> {
            let request = self.client.post(&self.url).json(&body);
            async move {
                let response = request
                    .send()
                    .await
                    .map_err(|err| NotifyError::Request(Box::new(err)))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(NotifyError::Status(status.as_u16()));
                }
                Ok(())
            }
            .boxed()
        }
    }

    impl Notifier for WebhookNotifier {
        fn run_changed(&self, run: RunSummary) -> BoxFuture<'static, Result<(), NotifyError>> {
            self.post(json!({ "event": "runChanged", "run": run }))
        }

        fn checklist_completed(&self) -> BoxFuture<'static, Result<(), NotifyError>> {
            self.post(json!({ "event": "checklistCompleted" }))
        }
    }
}
