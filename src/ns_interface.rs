// Shared types and constants for the network simulation core.
//
// The values below mirror the demo network's tuning: a fixed central hub,
// devices spawning inside a bounded viewport, a 10% chance of an extra
// peer-to-peer link, and a verification pulse every 3 seconds that fades
// 1.5 seconds later.

/// Simulated milliseconds since session start
pub type SimTime = u64;

// String ids to keep the rendering layer's node/edge keys stable
pub type ParticipantId = String;
pub type ConnectionId = String;

/// Reserved id of the central hub; present from initialization, never removed
pub const HUB_ID: &str = "network";
pub const HUB_LABEL: &str = "EdgenOS Network";

// Spawn viewport for new devices (the hub sits above it)
pub const SPAWN_X_MIN: f64 = 100.0;
pub const SPAWN_X_MAX: f64 = 700.0;
pub const SPAWN_Y_MIN: f64 = 150.0;
pub const SPAWN_Y_MAX: f64 = 550.0;

/// Chance that a joining device also links to an existing device
pub const PEER_LINK_PROBABILITY: f64 = 0.10;

// Synthetic load gauge: joins push it up, verifications bleed it off
pub const LOAD_MAX: u8 = 100;
pub const LOAD_STEP_JOIN: u8 = 10;
pub const LOAD_STEP_VERIFY: u8 = 5;

/// Default recurring verification interval
pub const VERIFY_INTERVAL_MS: SimTime = 3000;
/// Delay before a verification highlight is cleared again
pub const HIGHLIGHT_CLEAR_MS: SimTime = 1500;

// ============================================================================
// Graph Data Model
// ============================================================================

/// Cosmetic device classification, chosen uniformly at random per device
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeviceKind {
    Browser,
    Smartphone,
    Iot,
}

impl DeviceKind {
    pub const ALL: [DeviceKind; 3] = [DeviceKind::Browser, DeviceKind::Smartphone, DeviceKind::Iot];

    /// Display form used in participant labels
    pub fn label(&self) -> &'static str {
        match self {
            DeviceKind::Browser => "Browser",
            DeviceKind::Smartphone => "Smartphone",
            DeviceKind::Iot => "IoT",
        }
    }
}

/// 2D coordinate inside the rendering viewport; assigned once at creation
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

pub const HUB_POSITION: Position = Position { x: 400.0, y: 50.0 };

/// A simulated device participating in the network
#[derive(Clone, Debug, PartialEq)]
pub struct Participant {
    pub id: ParticipantId,
    pub kind: DeviceKind,
    pub label: String,
    pub position: Position,
}

/// Link classification: every device gets one Hub link, some get a Peer link
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LinkKind {
    Hub,
    Peer,
}

/// A simulated link between two participants
#[derive(Clone, Debug, PartialEq)]
pub struct Connection {
    pub id: ConnectionId,
    pub source: ParticipantId,
    pub target: ParticipantId,
    pub kind: LinkKind,
    /// Transient visual state toggled by the verification cycle
    pub highlighted: bool,
}

/// Connection ids are derived from their endpoints, so they stay stable
/// and unique as long as participant ids are.
pub fn connection_id(source: &str, target: &str) -> ConnectionId {
    format!("e-{}-{}", source, target)
}

// ============================================================================
// Event Logging System
// ============================================================================

/// Change events emitted after each committed mutation
///
/// The rendering layer subscribes via [`EventSink`] and pulls a fresh
/// snapshot on every event; a test harness can record them instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A device joined: its mandatory hub link was created, and possibly
    /// one extra peer link
    ParticipantJoined {
        id: ParticipantId,
        kind: DeviceKind,
        peer_link: Option<ConnectionId>,
    },
    /// A verification cycle highlighted this connection
    ConnectionHighlighted { id: ConnectionId },
    /// A deferred clear reset all highlights (`connections` were lit)
    HighlightCleared { connections: usize },
    /// A verification cycle ran; `sequence` is the running total
    VerificationRun { sequence: u64, load: u8 },
}

/// Trait for consuming change events from the simulation
pub trait EventSink {
    fn log(&mut self, time: SimTime, event: Event);
}

/// No-op event sink for headless use (zero overhead)
pub struct NoOpSink;

impl EventSink for NoOpSink {
    #[inline(always)]
    fn log(&mut self, _time: SimTime, _event: Event) {
        // Intentionally empty - compiler should optimize this away
    }
}
