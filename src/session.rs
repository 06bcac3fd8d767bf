use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::client::{ProjectionResponse, ProjectionService};
use crate::config::EngineConfig;
use crate::core::{
    AdjustmentEdit, AssetBreakdown, Composer, FiSnapshot, OverrideEdit, OverrideField, Plan,
    ProjectionRequest, RecalcScheduler, ScenarioState, SolverConfig, Trigger,
    WhatIfAdjustments, scenario_checksum,
};
use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioEvent {
    PlanLoaded(Plan),
    EditOverride(OverrideEdit),
    ClearOverride(OverrideField),
    ResetOverrides,
    Adjust(AdjustmentEdit),
    SetAdjustments(WhatIfAdjustments),
    ResetAdjustments,
    AssetsUpdated(AssetBreakdown),
    DisplayCurrency(Option<String>),
    Reset,
}

#[derive(Debug, Clone, Default)]
pub struct ProjectionView {
    /// Last successfully applied projection. Kept when a later call fails.
    pub projection: Option<ProjectionResponse>,
    pub is_calculating: bool,
    pub error: Option<String>,
    pub checksum: u32,
    pub applied_sequence: u64,
    pub request: Option<ProjectionRequest>,
    pub fi: Option<FiSnapshot>,
}

struct Completion {
    sequence: u64,
    outcome: Result<ProjectionResponse, ClientError>,
}

pub struct ScenarioSession<C> {
    state: ScenarioState,
    scheduler: RecalcScheduler,
    client: Arc<C>,
    solver: SolverConfig,
    as_of_year: i32,
    next_sequence: u64,
    settled_sequence: u64,
    in_flight: usize,
    view: watch::Sender<ProjectionView>,
    completions: mpsc::UnboundedSender<Completion>,
}

pub struct SessionHandle {
    events: mpsc::UnboundedSender<ScenarioEvent>,
    view: watch::Receiver<ProjectionView>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn send(&self, event: ScenarioEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn subscribe(&self) -> watch::Receiver<ProjectionView> {
        self.view.clone()
    }

    pub fn current(&self) -> ProjectionView {
        self.view.borrow().clone()
    }

    pub async fn shutdown(self) {
        let SessionHandle { events, task, .. } = self;
        drop(events);
        if let Err(e) = task.await {
            error!("scenario session task failed: {e}");
        }
    }
}

impl<C: ProjectionService> ScenarioSession<C> {
    pub fn new(client: Arc<C>, config: &EngineConfig, as_of_year: i32) -> Self {
        let (view, _) = watch::channel(ProjectionView::default());
        // replaced in spawn(); a session that is never spawned drops completions
        let (completions, _) = mpsc::unbounded_channel();
        Self {
            state: ScenarioState::default(),
            scheduler: RecalcScheduler::new(config.scheduler.debounce()),
            client,
            solver: config.solver,
            as_of_year,
            next_sequence: 0,
            settled_sequence: 0,
            in_flight: 0,
            view,
            completions,
        }
    }

    pub fn spawn(mut self) -> SessionHandle {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        self.completions = completions_tx;
        let view = self.view.subscribe();
        let task = tokio::spawn(self.run(events_rx, completions_rx));
        SessionHandle {
            events: events_tx,
            view,
            task,
        }
    }

    async fn run(
        mut self,
        mut events: mpsc::UnboundedReceiver<ScenarioEvent>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        loop {
            let deadline = self.scheduler.deadline();
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event, Instant::now()),
                    None => break,
                },
                Some(done) = completions.recv() => self.apply_completion(done),
                _ = wait_until(deadline) => self.on_timer(Instant::now()),
            }
        }
        debug!("scenario session stopped");
    }

    fn handle_event(&mut self, event: ScenarioEvent, now: Instant) {
        match event {
            ScenarioEvent::PlanLoaded(plan) => self.state.plan = Some(plan),
            ScenarioEvent::EditOverride(edit) => self.state.overrides.apply(edit),
            ScenarioEvent::ClearOverride(field) => self.state.overrides.clear(field),
            ScenarioEvent::ResetOverrides => self.state.overrides.reset(),
            ScenarioEvent::Adjust(edit) => self.state.adjustments.apply(edit),
            ScenarioEvent::SetAdjustments(adjustments) => self.state.adjustments = adjustments,
            ScenarioEvent::ResetAdjustments => self.state.adjustments.reset(),
            ScenarioEvent::AssetsUpdated(assets) => self.state.assets = assets,
            ScenarioEvent::DisplayCurrency(currency) => self.state.display_currency = currency,
            ScenarioEvent::Reset => self.scheduler.reset(),
        }

        let checksum = scenario_checksum(&self.state);
        self.publish_local(checksum);

        match self.scheduler.observe(checksum, now) {
            Trigger::Immediate => self.dispatch(),
            Trigger::Debounced(deadline) => {
                debug!(
                    in_ms = deadline.saturating_duration_since(now).as_millis() as u64,
                    "recalculation scheduled"
                );
            }
            Trigger::Nothing => {}
        }
    }

    fn on_timer(&mut self, now: Instant) {
        let checksum = scenario_checksum(&self.state);
        if self.scheduler.fire(checksum, now) {
            self.dispatch();
        }
    }

    fn composer(&self) -> Composer {
        Composer::new(self.as_of_year)
    }

    // The FI snapshot never waits for the network.
    fn publish_local(&self, checksum: Option<u32>) {
        let request = self.composer().compose_state(&self.state);
        let fi = request
            .as_ref()
            .map(|request| FiSnapshot::compute(request, &self.state.assets, &self.solver));
        self.view.send_modify(|view| {
            view.checksum = checksum.unwrap_or(0);
            view.request = request;
            view.fi = fi;
        });
    }

    fn dispatch(&mut self) {
        // always composed fresh from current state, never from the checksum
        let Some(request) = self.composer().compose_state(&self.state) else {
            return;
        };
        self.next_sequence += 1;
        self.in_flight += 1;
        let sequence = self.next_sequence;
        info!(
            sequence,
            baseline = self.scheduler.baseline(),
            "recalculating projection"
        );
        self.view.send_modify(|view| view.is_calculating = true);

        let client = Arc::clone(&self.client);
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let outcome = client.project(&request).await;
            // receiver gone means the session stopped; nothing to apply
            let _ = completions.send(Completion { sequence, outcome });
        });
    }

    fn apply_completion(&mut self, done: Completion) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let is_calculating = self.in_flight > 0;
        let Completion { sequence, outcome } = done;

        if sequence <= self.settled_sequence {
            warn!(
                sequence,
                settled = self.settled_sequence,
                "discarding stale projection response"
            );
            self.view
                .send_modify(|view| view.is_calculating = is_calculating);
            return;
        }
        self.settled_sequence = sequence;

        match outcome {
            Ok(projection) => {
                info!(sequence, "projection applied");
                self.view.send_modify(|view| {
                    view.projection = Some(projection);
                    view.applied_sequence = sequence;
                    view.error = None;
                    view.is_calculating = is_calculating;
                });
            }
            Err(e) => {
                error!(sequence, "projection failed: {e}");
                self.view.send_modify(|view| {
                    view.error = Some(e.to_string());
                    view.is_calculating = is_calculating;
                });
            }
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}
