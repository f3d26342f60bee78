//! # ns_rust - EdgenOS Network Simulation Engine
//!
//! A memory-resident simulation of a decentralized-verification demo
//! network: devices join a graph around a fixed central hub, and a
//! recurring verification cycle transiently highlights one connection.
//! Nothing here performs real networking or proof verification - the
//! engine only produces the appearance of such a network for a rendering
//! layer to draw.
//!
//! ## Core Components
//!
//! - **NsGraph**: Graph store holding participants and connections; all
//!   structural mutation goes through it
//! - **NsScheduler**: Owns the graph, the session counters, and the
//!   logical clock; drives the recurring verification timer and the
//!   deferred highlight clears
//! - **Event/EventSink**: Change-notification surface; every committed
//!   mutation emits exactly one event
//!
//! ## Usage with a Rendering Layer
//!
//! The engine is headless. You need to:
//! 1. Construct an `NsScheduler` with your own `EventSink`
//! 2. Call `scheduler.advance(elapsed_ms)` from your frame/timer loop
//! 3. Bind `scheduler.request_add_device()` to the user control
//! 4. Re-render from `scheduler.snapshot()` after every sink event
//!
//! ```no_run
//! use ns_rust::{NsScheduler, SchedulerConfig, VERIFY_INTERVAL_MS};
//!
//! let mut scheduler = NsScheduler::new(SchedulerConfig::default());
//! scheduler.start(VERIFY_INTERVAL_MS);
//!
//! // In your UI loop:
//! let _ = scheduler.request_add_device();
//! scheduler.advance(3_000);
//! let snapshot = scheduler.snapshot();
//! println!(
//!     "{} participants, {} connections, load {}%",
//!     snapshot.participants.len(),
//!     snapshot.connections.len(),
//!     scheduler.counters().load()
//! );
//! ```
//!
//! ## Testing and Simulation
//!
//! Time is a logical millisecond clock driven through `advance_to`, so
//! tests and the session simulator in `simulator/` run whole sessions
//! deterministically from a fixed seed without wall-clock sleeps.

pub mod ns_graph;
pub mod ns_interface;
pub mod ns_scheduler;

// Re-export commonly used types
pub use ns_graph::{GraphSnapshot, NsGraph};
pub use ns_interface::{
    connection_id, Connection, ConnectionId, DeviceKind, Event, EventSink, LinkKind, NoOpSink,
    Participant, ParticipantId, Position, SimTime, HIGHLIGHT_CLEAR_MS, HUB_ID, HUB_LABEL,
    LOAD_MAX, LOAD_STEP_JOIN, LOAD_STEP_VERIFY, PEER_LINK_PROBABILITY, VERIFY_INTERVAL_MS,
};
pub use ns_scheduler::{NsScheduler, SchedulerConfig, SimCounters};
