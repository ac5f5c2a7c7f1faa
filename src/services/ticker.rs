use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{Mutex, oneshot},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tracing::{debug, warn};

use crate::{
    services::broadcast_events,
    state::{hub::BroadcastHub, timer::Timer},
};

/// Periodic task refreshing the timer's elapsed value and broadcasting it.
///
/// [`Ticker::stop`] resolves only once the task has exited, so no tick can
/// land after it returns. It must not be awaited while the timer lock is held.
pub struct Ticker {
    stop: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Start ticking every `period`, first tick one period from now.
    pub fn spawn(timer: Arc<Mutex<Timer>>, hub: BroadcastHub, period: Duration) -> Self {
        let (stop, mut stop_rx) = oneshot::channel();
        let first = Instant::now() + period;
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = interval.tick() => {
                        let mut timer = timer.lock().await;
                        match timer.tick(Instant::now()) {
                            Some(elapsed) => broadcast_events::broadcast_time(&hub, elapsed),
                            None => break,
                        }
                    }
                }
            }
            debug!("tick task exited");
        });
        Self { stop, handle }
    }

    /// Signal the task and wait for it to finish.
    pub async fn stop(self) {
        let _ = self.stop.send(());
        if let Err(err) = self.handle.await {
            warn!(error = %err, "tick task ended abnormally");
        }
    }
}
