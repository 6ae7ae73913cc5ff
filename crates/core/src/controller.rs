//! Owns a village and drives its timers.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::{
    runtime::Handle,
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    building::{BuildingKind, ConstructionError, ConstructionReceipt},
    config::SimulationConfig,
    ledger::ResourceDelta,
    message::{MessageBoard, MessageKind, TransientMessage},
    snapshot::VillageSnapshot,
    state::SimulationState,
};

/// Notifications emitted after state changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VillageEvent {
    /// The production ticker credited the ledger.
    Produced(ResourceDelta),
    /// A building was upgraded.
    Constructed(ConstructionReceipt),
    /// A construction attempt was refused.
    ConstructionRejected(ConstructionError),
    /// The status message was replaced or cleared.
    MessageChanged(Option<TransientMessage>),
}

struct Inner {
    state: SimulationState,
    messages: MessageBoard,
    message_timer: Option<JoinHandle<()>>,
}

struct Shared {
    config: SimulationConfig,
    inner: Mutex<Inner>,
    events: Mutex<Option<mpsc::UnboundedSender<VillageEvent>>>,
}

impl Shared {
    /// Credit one production tick under the state lock.
    fn produce(&self) -> ResourceDelta {
        let delta = self.inner.lock().state.produce();
        self.emit(vec![VillageEvent::Produced(delta)]);
        delta
    }

    /// Attempt one construction under the state lock and post its outcome.
    fn construct(
        self: &Arc<Self>,
        kind: BuildingKind,
    ) -> Result<ConstructionReceipt, ConstructionError> {
        let (result, events) = {
            let mut inner = self.inner.lock();
            let result = inner.state.construct(kind);
            let (event, posted) = match &result {
                Ok(receipt) => (
                    VillageEvent::Constructed(*receipt),
                    MessageKind::Built(receipt.kind),
                ),
                Err(err) => (
                    VillageEvent::ConstructionRejected(err.clone()),
                    MessageKind::InsufficientResources,
                ),
            };
            let message = inner.messages.post(posted);
            self.schedule_dismissal(&mut inner, message.id);
            (result, vec![event, VillageEvent::MessageChanged(Some(message))])
        };
        self.emit(events);
        result
    }

    /// Replace any pending dismissal with one for message `id`.
    fn schedule_dismissal(self: &Arc<Self>, inner: &mut Inner, id: u64) {
        if let Some(previous) = inner.message_timer.take() {
            previous.abort();
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!(id, "No runtime available; message will not auto-clear");
            return;
        };
        let shared = Arc::clone(self);
        let delay = self.config.message_duration();
        inner.message_timer = Some(runtime.spawn(async move {
            time::sleep(delay).await;
            shared.dismiss(id);
        }));
    }

    fn dismiss(&self, id: u64) {
        let cleared = {
            let mut inner = self.inner.lock();
            let cleared = inner.messages.dismiss(id);
            if cleared {
                inner.message_timer = None;
            }
            cleared
        };
        if cleared {
            debug!(id, "Message dismissed");
            self.emit(vec![VillageEvent::MessageChanged(None)]);
        }
    }

    fn emit(&self, events: Vec<VillageEvent>) {
        if let Some(sender) = self.events.lock().as_ref() {
            for event in events {
                let _ = sender.send(event);
            }
        }
    }
}

/// Single owner of a village's state and timers.
///
/// Call [`start`](Self::start) to begin production and [`stop`](Self::stop)
/// (or drop the controller) to release every timer.
pub struct VillageController {
    shared: Arc<Shared>,
    ticker: Option<JoinHandle<()>>,
}

impl VillageController {
    /// Create a stopped controller with a fresh village.
    pub fn new(config: SimulationConfig) -> Self {
        let state = SimulationState::new(&config);
        Self {
            shared: Arc::new(Shared {
                config,
                inner: Mutex::new(Inner {
                    state,
                    messages: MessageBoard::default(),
                    message_timer: None,
                }),
                events: Mutex::new(None),
            }),
            ticker: None,
        }
    }

    /// Forward [`VillageEvent`]s to `sender`, replacing any previous sink.
    pub fn attach_events(&mut self, sender: mpsc::UnboundedSender<VillageEvent>) {
        *self.shared.events.lock() = Some(sender);
    }

    /// Parameters this controller was built with.
    pub fn config(&self) -> &SimulationConfig {
        &self.shared.config
    }

    /// Spawn the production ticker. The first tick lands one full interval
    /// after this call. Calling it while already running does nothing.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn start(&mut self) {
        if self.is_running() {
            warn!("Production ticker already running");
            return;
        }

        let shared = Arc::clone(&self.shared);
        let period = self.shared.config.tick_interval();
        let first_tick = Instant::now() + period;
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = time::interval_at(first_tick, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                shared.produce();
            }
        }));
        let interval_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX);
        info!(interval_ms, "Production ticker started");
    }

    /// Cancel the ticker and any pending message timer. Safe to call twice.
    pub fn stop(&mut self) {
        if let Some(timer) = self.shared.inner.lock().message_timer.take() {
            timer.abort();
            debug!("Message timer cancelled");
        }
        match self.ticker.take() {
            Some(ticker) => {
                ticker.abort();
                info!("Production ticker stopped");
            }
            None => debug!("Production ticker already stopped"),
        }
    }

    /// Whether the production ticker is active.
    pub fn is_running(&self) -> bool {
        self.ticker
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Attempt one construction of `kind`, posting a status message either way.
    pub fn construct(&self, kind: BuildingKind) -> Result<ConstructionReceipt, ConstructionError> {
        self.shared.construct(kind)
    }

    /// Apply one production tick immediately, outside the timer.
    pub fn produce(&self) -> ResourceDelta {
        self.shared.produce()
    }

    /// Copy of the current state for rendering.
    pub fn snapshot(&self) -> VillageSnapshot {
        let inner = self.shared.inner.lock();
        VillageSnapshot {
            resources: inner.state.ledger().amounts(),
            population: inner.state.population(),
            levels: inner.state.levels().clone(),
            message: inner.messages.current().cloned(),
            ticks: inner.state.ticks(),
            running: self.is_running(),
        }
    }
}

impl Drop for VillageController {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::models::{ResourceAmounts, ResourceKind};

    #[tokio::test(start_paused = true)]
    async fn ticker_credits_every_interval() {
        let mut controller = VillageController::new(SimulationConfig::default());
        controller.construct(BuildingKind::Woodcutter).unwrap();
        controller.construct(BuildingKind::Woodcutter).unwrap();
        assert_eq!(controller.snapshot().resources.wood, 380);

        controller.start();
        assert!(controller.is_running());

        time::sleep(Duration::from_millis(2_999)).await;
        assert_eq!(controller.snapshot().resources.wood, 380);

        time::sleep(Duration::from_millis(2)).await;
        assert_eq!(controller.snapshot().resources.wood, 390);

        time::sleep(Duration::from_millis(3_000)).await;
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.resources.wood, 400);
        assert_eq!(snapshot.ticks, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_production_and_is_idempotent() {
        let mut controller = VillageController::new(SimulationConfig::default());
        controller.construct(BuildingKind::Cropland).unwrap();
        controller.start();
        controller.start();

        time::sleep(Duration::from_millis(3_001)).await;
        assert_eq!(controller.snapshot().ticks, 1);

        controller.stop();
        controller.stop();
        assert!(!controller.is_running());

        let crop = controller.snapshot().resources.crop;
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(controller.snapshot().resources.crop, crop);
        assert_eq!(controller.snapshot().ticks, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn newer_message_survives_older_timer() {
        let controller = VillageController::new(SimulationConfig::default());
        controller.construct(BuildingKind::TownHall).unwrap();
        let first = controller.snapshot().message.unwrap();

        time::sleep(Duration::from_millis(2_000)).await;
        controller.construct(BuildingKind::Barracks).unwrap();
        let second = controller.snapshot().message.unwrap();
        assert_ne!(first.id, second.id);

        time::sleep(Duration::from_millis(1_500)).await;
        assert_eq!(controller.snapshot().message, Some(second));

        time::sleep(Duration::from_millis(1_600)).await;
        assert_eq!(controller.snapshot().message, None);
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_attempt_posts_failure_and_keeps_state() {
        let config = SimulationConfig {
            initial_resources: ResourceAmounts::uniform(10),
            ..SimulationConfig::default()
        };
        let controller = VillageController::new(config);
        let before = controller.snapshot();

        let err = controller.construct(BuildingKind::Granary).unwrap_err();
        assert!(matches!(
            err,
            ConstructionError::InsufficientResources {
                kind: BuildingKind::Granary,
                ..
            }
        ));

        let after = controller.snapshot();
        assert_eq!(after.resources, before.resources);
        assert_eq!(after.level(BuildingKind::Granary), 0);
        assert_eq!(after.population, 50);
        assert_eq!(
            after.message.map(|message| message.kind),
            Some(MessageKind::InsufficientResources)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn events_follow_state_changes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut controller = VillageController::new(SimulationConfig::default());
        controller.attach_events(tx);

        let receipt = controller.construct(BuildingKind::IronMine).unwrap();
        assert_eq!(rx.recv().await, Some(VillageEvent::Constructed(receipt)));
        assert!(matches!(
            rx.recv().await,
            Some(VillageEvent::MessageChanged(Some(TransientMessage {
                kind: MessageKind::Built(BuildingKind::IronMine),
                ..
            })))
        ));

        controller.start();
        let mut saw_produce = false;
        let mut saw_clear = false;
        while !(saw_produce && saw_clear) {
            match rx.recv().await {
                Some(VillageEvent::Produced(delta)) => {
                    assert_eq!(delta.get(ResourceKind::Iron), 5);
                    saw_produce = true;
                }
                Some(VillageEvent::MessageChanged(None)) => saw_clear = true,
                Some(other) => panic!("unexpected event {other:?}"),
                None => panic!("event channel closed"),
            }
        }
        controller.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_cancels_pending_message_timer() {
        let mut controller = VillageController::new(SimulationConfig::default());
        controller.start();
        controller.stop();

        controller.construct(BuildingKind::Woodcutter).unwrap();
        assert!(controller.shared.inner.lock().message_timer.is_some());

        controller.stop();
        assert!(controller.shared.inner.lock().message_timer.is_none());

        time::sleep(Duration::from_millis(3_100)).await;
        assert!(matches!(
            controller.snapshot().message,
            Some(TransientMessage {
                kind: MessageKind::Built(BuildingKind::Woodcutter),
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_started_controller_stops_production() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut controller = VillageController::new(SimulationConfig::default());
        controller.attach_events(tx);
        controller.construct(BuildingKind::ClayPit).unwrap();
        controller.start();

        time::sleep(Duration::from_millis(3_001)).await;
        let mut produced = 0;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, VillageEvent::Produced(_)) {
                produced += 1;
            }
        }
        assert_eq!(produced, 1);

        controller.construct(BuildingKind::Granary).unwrap();
        drop(controller);
        while rx.try_recv().is_ok() {}

        time::sleep(Duration::from_secs(30)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_counts_from_start() {
        let mut controller = VillageController::new(SimulationConfig::default());
        controller.construct(BuildingKind::IronMine).unwrap();
        controller.start();

        time::advance(Duration::from_millis(3_000)).await;
        tokio::task::yield_now().await;
        assert_eq!(controller.snapshot().ticks, 1);
    }

    #[test]
    fn construct_works_without_runtime() {
        let controller = VillageController::new(SimulationConfig::default());
        let receipt = controller.construct(BuildingKind::Woodcutter).unwrap();
        assert_eq!(receipt.new_level, 1);
        assert_eq!(receipt.population, 60);
        assert_eq!(controller.produce().get(ResourceKind::Wood), 5);
        assert!(!controller.snapshot().running);
    }
}
