use tokio::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SchedulerState {
    Idle,
    Armed { baseline: u32 },
    Pending { baseline: u32, deadline: Instant },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Trigger {
    Nothing,
    Immediate,
    Debounced(Instant),
}

#[derive(Debug, Clone)]
pub struct RecalcScheduler {
    state: SchedulerState,
    debounce: Duration,
}

impl Default for RecalcScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl RecalcScheduler {
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: SchedulerState::Idle,
            debounce,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn baseline(&self) -> u32 {
        match self.state {
            SchedulerState::Idle => 0,
            SchedulerState::Armed { baseline } | SchedulerState::Pending { baseline, .. } => {
                baseline
            }
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            SchedulerState::Pending { deadline, .. } => Some(deadline),
            _ => None,
        }
    }

    pub fn observe(&mut self, checksum: Option<u32>, now: Instant) -> Trigger {
        let Some(checksum) = checksum else {
            return Trigger::Nothing;
        };

        match self.state {
            SchedulerState::Idle => {
                debug!(checksum, "scheduler armed with first plan");
                self.state = SchedulerState::Armed { baseline: checksum };
                Trigger::Immediate
            }
            SchedulerState::Armed { baseline } if checksum == baseline => Trigger::Nothing,
            SchedulerState::Pending { baseline, .. } if checksum == baseline => {
                // inputs went back to what was last calculated
                debug!(checksum, "pending recalculation cancelled");
                self.state = SchedulerState::Armed { baseline };
                Trigger::Nothing
            }
            SchedulerState::Armed { baseline } | SchedulerState::Pending { baseline, .. } => {
                let deadline = now + self.debounce;
                debug!(baseline, checksum, "recalculation debounced");
                self.state = SchedulerState::Pending { baseline, deadline };
                Trigger::Debounced(deadline)
            }
        }
    }

    /// Called when the timer elapses. Returns true when a calculation must run
    /// now; the baseline becomes the checksum observed at this moment.
    pub fn fire(&mut self, checksum: Option<u32>, now: Instant) -> bool {
        let SchedulerState::Pending { baseline, deadline } = self.state else {
            return false;
        };
        if now < deadline {
            return false;
        }
        match checksum {
            Some(current) => {
                self.state = SchedulerState::Armed { baseline: current };
                true
            }
            None => {
                self.state = SchedulerState::Armed { baseline };
                false
            }
        }
    }

    pub fn reset(&mut self) {
        self.state = SchedulerState::Idle;
    }
}
