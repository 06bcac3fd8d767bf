use std::sync::Arc;

use tokio::sync::watch;
use tracing::{error, info};

use crate::client::{ProjectionService, SimulationResult};
use crate::config::MonteCarloConfig;
use crate::core::{Composer, ScenarioState};
use crate::error::MonteCarloError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonteCarloState {
    pub result: Option<SimulationResult>,
    pub is_running: bool,
    pub error: Option<String>,
}

pub struct MonteCarloController<C> {
    client: Arc<C>,
    allowed_iterations: Vec<u32>,
    default_iterations: u32,
    state: watch::Sender<MonteCarloState>,
}

impl<C: ProjectionService> MonteCarloController<C> {
    pub fn new(client: Arc<C>, config: &MonteCarloConfig) -> Self {
        let (state, _) = watch::channel(MonteCarloState::default());
        Self {
            client,
            allowed_iterations: config.allowed_iterations.clone(),
            default_iterations: config.default_iterations,
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<MonteCarloState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> MonteCarloState {
        self.state.borrow().clone()
    }

    pub fn allowed_iterations(&self) -> &[u32] {
        &self.allowed_iterations
    }

    pub fn default_iterations(&self) -> u32 {
        self.default_iterations
    }

    pub async fn run(
        &self,
        composer: &Composer,
        scenario: &ScenarioState,
        iterations: u32,
    ) -> Result<SimulationResult, MonteCarloError> {
        if !self.allowed_iterations.contains(&iterations) {
            let err = MonteCarloError::UnsupportedIterations {
                requested: iterations,
                allowed: self.allowed_iterations.clone(),
            };
            self.state
                .send_modify(|state| state.error = Some(err.to_string()));
            return Err(err);
        }
        let Some(request) = composer.compose_monte_carlo(scenario, iterations) else {
            self.state
                .send_modify(|state| state.error = Some(MonteCarloError::NoPlan.to_string()));
            return Err(MonteCarloError::NoPlan);
        };

        info!(iterations, "running Monte Carlo simulation");
        self.state.send_modify(|state| {
            state.is_running = true;
            state.error = None;
        });

        match self.client.simulate(&request).await {
            Ok(result) => {
                self.state.send_modify(|state| {
                    state.result = Some(result.clone());
                    state.is_running = false;
                });
                Ok(result)
            }
            Err(e) => {
                error!("Monte Carlo simulation failed: {e}");
                self.state.send_modify(|state| {
                    state.error = Some(e.to_string());
                    state.is_running = false;
                });
                Err(e.into())
            }
        }
    }
}
