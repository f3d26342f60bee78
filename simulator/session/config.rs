// Session Simulator Configuration

use ns_rust::{SimTime, HIGHLIGHT_CLEAR_MS, VERIFY_INTERVAL_MS};
use serde::Deserialize;

// ============================================================================
// Main Configuration
// ============================================================================

/// Configuration for one simulated session
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Total number of simulation rounds
    #[serde(default = "default_rounds")]
    pub rounds: usize,

    /// Simulated time per round (milliseconds)
    #[serde(default = "default_round_ms")]
    pub round_ms: SimTime,

    /// Probability that a device joins in a given round
    #[serde(default = "default_join_probability")]
    pub join_probability: f64,

    /// Recurring verification interval
    #[serde(default = "default_verify_interval_ms")]
    pub verify_interval_ms: SimTime,

    /// Deferred highlight-clear delay
    #[serde(default = "default_highlight_clear_ms")]
    pub highlight_clear_ms: SimTime,

    /// How often to sample metrics (every N rounds; 0 disables sampling)
    #[serde(default = "default_sample_interval")]
    pub sample_interval: usize,

    /// Random seed for reproducibility (set from the command line)
    #[serde(skip)]
    pub seed: Option<[u8; 32]>,

    /// Scheduled session events
    #[serde(default)]
    pub events: EventSchedule,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            rounds: default_rounds(),
            round_ms: default_round_ms(),
            join_probability: default_join_probability(),
            verify_interval_ms: default_verify_interval_ms(),
            highlight_clear_ms: default_highlight_clear_ms(),
            sample_interval: default_sample_interval(),
            seed: None,
            events: EventSchedule::default(),
        }
    }
}

fn default_rounds() -> usize {
    200
}

fn default_round_ms() -> SimTime {
    250
}

fn default_join_probability() -> f64 {
    0.15
}

fn default_verify_interval_ms() -> SimTime {
    VERIFY_INTERVAL_MS
}

fn default_highlight_clear_ms() -> SimTime {
    HIGHLIGHT_CLEAR_MS
}

fn default_sample_interval() -> usize {
    20
}

// ============================================================================
// Event Scheduling
// ============================================================================

/// Schedule of session events
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventSchedule {
    pub events: Vec<ScheduledEvent>,
}

/// A single scheduled event
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduledEvent {
    /// Round number when the event triggers
    pub round: usize,

    /// The event to trigger
    pub event: SessionEvent,
}

/// Types of session events
#[derive(Debug, Clone, Deserialize)]
pub enum SessionEvent {
    /// Add a burst of devices in one round
    AddDevices { count: usize },

    /// Cancel the recurring verification timer
    StopVerifier,

    /// (Re)arm the recurring verification timer
    StartVerifier { interval_ms: SimTime },

    /// Print a progress line
    ReportStats { label: Option<String> },
}
