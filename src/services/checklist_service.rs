use tracing::{debug, info};

use crate::{
    dto::checklist::ChecklistResponse,
    error::ServiceError,
    services::{
        broadcast_events,
        notifier::{Notification, notify_in_background},
    },
    state::SharedState,
};

/// Current checklist.
pub async fn list(state: &SharedState) -> ChecklistResponse {
    ChecklistResponse::from(&*state.checklist().lock().await)
}

/// Whether every item is done.
pub async fn is_done(state: &SharedState) -> bool {
    state.checklist().lock().await.is_done()
}

/// Append a pending item.
pub async fn add(state: &SharedState, item: String) -> Result<ChecklistResponse, ServiceError> {
    let mut checklist = state.checklist().lock().await;
    if !checklist.add(item.clone()) {
        return Err(ServiceError::InvalidInput(format!(
            "checklist item `{item}` already exists"
        )));
    }
    broadcast_events::broadcast_checklist(state.hub(), &checklist);
    info!(item = %item, "checklist item added");
    Ok(ChecklistResponse::from(&*checklist))
}

/// Remove an item.
pub async fn remove(state: &SharedState, item: &str) -> Result<ChecklistResponse, ServiceError> {
    let mut checklist = state.checklist().lock().await;
    if !checklist.remove(item) {
        return Err(not_found(item));
    }
    broadcast_events::broadcast_checklist(state.hub(), &checklist);
    info!(item, "checklist item removed");
    Ok(ChecklistResponse::from(&*checklist))
}

/// Flip an item. Completing the list fires a "checklist completed" notification.
pub async fn toggle(state: &SharedState, item: &str) -> Result<ChecklistResponse, ServiceError> {
    let mut checklist = state.checklist().lock().await;
    let was_done = checklist.is_done();
    let done = checklist.toggle(item).ok_or_else(|| not_found(item))?;
    broadcast_events::broadcast_checklist(state.hub(), &checklist);
    debug!(item, done, "checklist item toggled");

    if !was_done && checklist.is_done() {
        info!("checklist completed");
        notify_in_background(state.notifier(), Notification::ChecklistCompleted);
    }
    Ok(ChecklistResponse::from(&*checklist))
}

/// Mark every item pending again, off the caller's path.
pub fn reset_in_background(state: SharedState) {
    tokio::spawn(async move {
        let mut checklist = state.checklist().lock().await;
        checklist.reset();
        broadcast_events::broadcast_checklist(state.hub(), &checklist);
        debug!("checklist reset");
    });
}

fn not_found(item: &str) -> ServiceError {
    ServiceError::NotFound(format!("checklist item `{item}`"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{
        Recorded, data_types, drain, sample_runs, seeded_state, settle,
    };

    #[tokio::test]
    async fn completing_checklist_notifies_once() {
        let (state, notifier) = seeded_state(sample_runs(1)).await;
        add(&state, "stream key".into()).await.unwrap();
        add(&state, "runner audio".into()).await.unwrap();

        toggle(&state, "stream key").await.unwrap();
        assert!(!is_done(&state).await);
        let response = toggle(&state, "runner audio").await.unwrap();
        assert!(response.done);
        settle().await;
        assert!(matches!(&notifier.sent()[..], [Recorded::ChecklistCompleted]));

        remove(&state, "runner audio").await.unwrap();
        assert!(is_done(&state).await);
        settle().await;
        assert_eq!(notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn unknown_and_duplicate_items_are_rejected() {
        let (state, _) = seeded_state(sample_runs(1)).await;
        add(&state, "layout".into()).await.unwrap();
        assert!(matches!(
            add(&state, "layout".into()).await,
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(matches!(
            toggle(&state, "nope").await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            remove(&state, "nope").await,
            Err(ServiceError::NotFound(_))
        ));
        assert_eq!(list(&state).await.items.len(), 1);
    }

    #[tokio::test]
    async fn changes_are_broadcast() {
        let (state, _) = seeded_state(sample_runs(1)).await;
        let mut client = broadcast_events::register_client(&state).await;
        drain(&mut client).await;

        add(&state, "camera".into()).await.unwrap();
        toggle(&state, "camera").await.unwrap();
        reset_in_background(state.clone());

        let frames = drain(&mut client).await;
        assert_eq!(
            data_types(&frames),
            ["checklistUpdate", "checklistUpdate", "checklistUpdate"]
        );
        assert_eq!(frames[1]["checklist"]["items"]["camera"], true);
        assert_eq!(frames[2]["checklist"]["items"]["camera"], false);
    }
}
