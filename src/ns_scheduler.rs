// Simulation scheduler: drives time-based behavior and the user actions.
//
// The scheduler owns the graph, the session counters, the rng, and a logical
// millisecond clock. All mutation happens on the caller's thread inside
// `advance_to` / `request_add_device`, so every mutation is complete before
// any snapshot read - there is no preemption mid-mutation.
//
// Two timer kinds exist: the recurring verification timer armed by `start`,
// and one-shot deferred clears scheduled per cycle. `stop` cancels only the
// recurring timer; already-scheduled clears still fire (they only reset
// highlight state). Dropping the scheduler discards both, which is the full
// session teardown.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ns_graph::{GraphSnapshot, NsGraph};
use crate::ns_interface::{
    Event, EventSink, NoOpSink, Participant, SimTime, HIGHLIGHT_CLEAR_MS, LOAD_MAX,
    LOAD_STEP_JOIN, LOAD_STEP_VERIFY, VERIFY_INTERVAL_MS,
};

// ============================================================================
// Configuration
// ============================================================================

/// Scheduler tuning for one simulation session
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Recurring verification interval in simulated ms (default: 3000)
    pub verify_interval_ms: SimTime,

    /// Delay before a highlight is cleared again (default: 1500)
    pub highlight_clear_ms: SimTime,

    /// Random seed for reproducibility (default: fresh entropy)
    pub seed: Option<[u8; 32]>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            verify_interval_ms: VERIFY_INTERVAL_MS,
            highlight_clear_ms: HIGHLIGHT_CLEAR_MS,
            seed: None,
        }
    }
}

// ============================================================================
// Session Counters
// ============================================================================

/// Aggregate counters for one simulation session
///
/// `participants` counts every participant ever added including the hub, so
/// it starts at 1. `load` is a synthetic gauge bounded to [0, 100]: joins
/// raise it by [`LOAD_STEP_JOIN`], verification cycles lower it by
/// [`LOAD_STEP_VERIFY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimCounters {
    participants: u64,
    verifications: u64,
    load: u8,
}

impl SimCounters {
    fn new() -> Self {
        Self {
            participants: 1,
            verifications: 0,
            load: 0,
        }
    }

    pub fn participants(&self) -> u64 {
        self.participants
    }

    pub fn verifications(&self) -> u64 {
        self.verifications
    }

    pub fn load(&self) -> u8 {
        self.load
    }

    fn record_join(&mut self) {
        self.participants += 1;
        self.load = LOAD_MAX.min(self.load + LOAD_STEP_JOIN);
    }

    fn record_verification(&mut self) {
        self.verifications += 1;
        self.load = self.load.saturating_sub(LOAD_STEP_VERIFY);
    }
}

// ============================================================================
// Scheduler
// ============================================================================

pub struct NsScheduler {
    graph: NsGraph,
    counters: SimCounters,
    config: SchedulerConfig,
    rng: StdRng,
    seed: [u8; 32],
    event_sink: Box<dyn EventSink>,
    now: SimTime,
    // Recurring verification timer; None while stopped
    next_cycle_at: Option<SimTime>,
    interval_ms: SimTime,
    // Deadlines of outstanding one-shot clears, in scheduling order.
    // The clear delay is constant, so this stays sorted.
    pending_clears: VecDeque<SimTime>,
}

impl NsScheduler {
    /// Create a scheduler with the default NoOpSink (zero overhead)
    pub fn new(config: SchedulerConfig) -> Self {
        Self::new_with_sink(config, Box::new(NoOpSink))
    }

    /// Create a scheduler with a custom event sink
    ///
    /// The sink is the change-notification mechanism: every committed
    /// mutation emits exactly one event, after which the observer can pull
    /// a fresh [`snapshot`](Self::snapshot).
    pub fn new_with_sink(config: SchedulerConfig, event_sink: Box<dyn EventSink>) -> Self {
        let seed = config.seed.unwrap_or_else(|| {
            let mut seed = [0u8; 32];
            rand::thread_rng().fill(&mut seed);
            seed
        });

        Self {
            graph: NsGraph::new(),
            counters: SimCounters::new(),
            rng: StdRng::from_seed(seed),
            seed,
            config,
            event_sink,
            now: 0,
            next_cycle_at: None,
            interval_ms: VERIFY_INTERVAL_MS,
            pending_clears: VecDeque::new(),
        }
    }

    /// Arm the recurring verification timer
    ///
    /// The first cycle fires one full interval from now. Re-entrant start
    /// replaces the previous timer; it never creates a duplicate.
    pub fn start(&mut self, interval_ms: SimTime) {
        let interval_ms = interval_ms.max(1);
        self.interval_ms = interval_ms;
        self.next_cycle_at = Some(self.now + interval_ms);
    }

    /// Cancel the recurring timer; no-op when not running
    ///
    /// Outstanding deferred clears from already-fired cycles are kept and
    /// still fire on a later `advance_to`.
    pub fn stop(&mut self) {
        self.next_cycle_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_cycle_at.is_some()
    }

    /// User action: add one device to the network
    ///
    /// On success bumps the participant counter and raises the load gauge.
    /// The `None` path (id collision inside the graph) leaves the counters
    /// untouched; it is logged by the graph store.
    pub fn request_add_device(&mut self) -> Option<Participant> {
        let participant =
            self.graph
                .add_participant(self.now, &mut self.rng, &mut *self.event_sink)?;
        self.counters.record_join();
        Some(participant)
    }

    /// One verification cycle; timer-driven, but callable directly in tests
    ///
    /// Counters update even when the graph has no connections yet. When a
    /// connection was highlighted, a one-shot clear is scheduled
    /// `highlight_clear_ms` from now and later fires unconditionally, even
    /// if a newer cycle has already moved the highlight elsewhere.
    pub fn run_verification_cycle(&mut self) {
        self.counters.record_verification();
        self.event_sink.log(
            self.now,
            Event::VerificationRun {
                sequence: self.counters.verifications(),
                load: self.counters.load(),
            },
        );

        let highlighted =
            self.graph
                .highlight_random_edge(self.now, &mut self.rng, &mut *self.event_sink);
        if highlighted.is_some() {
            self.pending_clears
                .push_back(self.now + self.config.highlight_clear_ms);
        }
    }

    /// Advance the logical clock by `delta_ms`, firing all due timers
    pub fn advance(&mut self, delta_ms: SimTime) {
        self.advance_to(self.now + delta_ms);
    }

    /// Advance the logical clock to `target`, firing all due timers
    ///
    /// Timers are applied strictly in deadline order, first-in-first-applied.
    /// At equal deadlines the earlier-scheduled deferred clear runs before
    /// the cycle. Time never moves backwards; a smaller target is a no-op.
    pub fn advance_to(&mut self, target: SimTime) {
        if target < self.now {
            return;
        }

        loop {
            let next_clear = self.pending_clears.front().copied().filter(|at| *at <= target);
            let next_cycle = self.next_cycle_at.filter(|at| *at <= target);

            match (next_clear, next_cycle) {
                (Some(clear_at), cycle_at) if cycle_at.map_or(true, |c| clear_at <= c) => {
                    self.pending_clears.pop_front();
                    self.now = clear_at;
                    self.graph.clear_highlight(self.now, &mut *self.event_sink);
                }
                (_, Some(cycle_at)) => {
                    self.now = cycle_at;
                    self.next_cycle_at = Some(cycle_at + self.interval_ms);
                    self.run_verification_cycle();
                }
                (None, None) => break,
                (Some(_), None) => unreachable!("clear with no pending cycle is handled by the first arm"),
            }
        }

        self.now = target;
    }

    /// Consistent read of the current graph state for rendering
    pub fn snapshot(&self) -> GraphSnapshot {
        self.graph.snapshot()
    }

    /// Read-only session counters
    pub fn counters(&self) -> &SimCounters {
        &self.counters
    }

    /// Read-only view of the graph store
    pub fn graph(&self) -> &NsGraph {
        &self.graph
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    /// The seed actually used, for reproducing a session
    pub fn seed(&self) -> [u8; 32] {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ns_interface::HUB_ID;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct RecordingSink {
        events: Rc<RefCell<Vec<(SimTime, Event)>>>,
    }

    impl EventSink for RecordingSink {
        fn log(&mut self, time: SimTime, event: Event) {
            self.events.borrow_mut().push((time, event));
        }
    }

    fn seeded_scheduler() -> NsScheduler {
        NsScheduler::new(SchedulerConfig {
            seed: Some([7u8; 32]),
            ..Default::default()
        })
    }

    fn recording_scheduler() -> (NsScheduler, Rc<RefCell<Vec<(SimTime, Event)>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = RecordingSink {
            events: Rc::clone(&events),
        };
        let scheduler = NsScheduler::new_with_sink(
            SchedulerConfig {
                seed: Some([7u8; 32]),
                ..Default::default()
            },
            Box::new(sink),
        );
        (scheduler, events)
    }

    fn highlighted_count(scheduler: &NsScheduler) -> usize {
        scheduler
            .snapshot()
            .connections
            .iter()
            .filter(|c| c.highlighted)
            .count()
    }

    #[test]
    fn test_fresh_session_counters() {
        let scheduler = seeded_scheduler();
        assert_eq!(scheduler.counters().participants(), 1);
        assert_eq!(scheduler.counters().verifications(), 0);
        assert_eq!(scheduler.counters().load(), 0);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_stop_before_start_is_a_no_op() {
        let mut scheduler = seeded_scheduler();
        scheduler.stop();
        scheduler.advance(10_000);

        assert_eq!(scheduler.counters().participants(), 1);
        assert_eq!(scheduler.counters().verifications(), 0);
        assert_eq!(scheduler.counters().load(), 0);
    }

    #[test]
    fn test_three_joins_then_one_cycle_then_clear() {
        // Start with only the hub: three adds give 4 participants and
        // 3 hub links; one cycle highlights one of them; the deferred
        // clear resets everything.
        let mut scheduler = seeded_scheduler();

        for _ in 0..3 {
            assert!(scheduler.request_add_device().is_some());
        }

        let snapshot = scheduler.snapshot();
        assert_eq!(snapshot.participants.len(), 4);
        assert_eq!(
            snapshot
                .connections
                .iter()
                .filter(|c| c.target == HUB_ID)
                .count(),
            3
        );
        assert_eq!(scheduler.counters().participants(), 4);

        scheduler.start(3000);
        scheduler.advance(3000);
        assert_eq!(scheduler.counters().verifications(), 1);
        assert_eq!(highlighted_count(&scheduler), 1);

        scheduler.stop();
        scheduler.advance(1500);
        assert_eq!(highlighted_count(&scheduler), 0);
    }

    #[test]
    fn test_load_is_capped_and_floored() {
        let mut scheduler = seeded_scheduler();

        for _ in 0..12 {
            scheduler.request_add_device();
        }
        assert_eq!(scheduler.counters().load(), 100);

        for _ in 0..25 {
            scheduler.run_verification_cycle();
        }
        assert_eq!(scheduler.counters().load(), 0);

        // One more cycle stays floored
        scheduler.run_verification_cycle();
        assert_eq!(scheduler.counters().load(), 0);
        assert_eq!(scheduler.counters().verifications(), 26);
    }

    #[test]
    fn test_cycle_on_empty_graph_still_counts() {
        let mut scheduler = seeded_scheduler();
        scheduler.start(3000);
        scheduler.advance(9000);

        assert_eq!(scheduler.counters().verifications(), 3);
        assert_eq!(scheduler.snapshot().connections.len(), 0);
    }

    #[test]
    fn test_recurring_timer_fires_per_interval() {
        let mut scheduler = seeded_scheduler();
        scheduler.request_add_device();
        scheduler.start(1000);

        scheduler.advance_to(999);
        assert_eq!(scheduler.counters().verifications(), 0);

        scheduler.advance_to(10_000);
        assert_eq!(scheduler.counters().verifications(), 10);
    }

    #[test]
    fn test_reentrant_start_replaces_the_timer() {
        let mut scheduler = seeded_scheduler();
        scheduler.request_add_device();

        scheduler.start(1000);
        scheduler.advance(500);
        // Rearm: the old 1000ms deadline must not fire
        scheduler.start(2000);

        scheduler.advance_to(2499);
        assert_eq!(scheduler.counters().verifications(), 0);

        scheduler.advance_to(2500);
        assert_eq!(scheduler.counters().verifications(), 1);
    }

    #[test]
    fn test_stop_keeps_outstanding_clears() {
        let mut scheduler = seeded_scheduler();
        scheduler.request_add_device();
        scheduler.start(3000);

        scheduler.advance(3000);
        assert_eq!(highlighted_count(&scheduler), 1);

        scheduler.stop();
        assert!(!scheduler.is_running());

        // The deferred clear from the fired cycle still runs, and no
        // further cycles do.
        scheduler.advance(20_000);
        assert_eq!(highlighted_count(&scheduler), 0);
        assert_eq!(scheduler.counters().verifications(), 1);
    }

    #[test]
    fn test_older_clear_resets_a_newer_highlight() {
        // Cycles outpace the clear delay: the cycle at 1000 schedules a
        // clear for 2500; the cycle at 2000 moves the highlight; the 2500
        // clear still fires unconditionally and resets it.
        let mut scheduler = seeded_scheduler();
        for _ in 0..8 {
            scheduler.request_add_device();
        }

        scheduler.start(1000);
        scheduler.advance_to(2000);
        assert_eq!(scheduler.counters().verifications(), 2);
        assert_eq!(highlighted_count(&scheduler), 1);

        scheduler.stop();
        scheduler.advance_to(2500);
        assert_eq!(highlighted_count(&scheduler), 0);
    }

    #[test]
    fn test_direct_cycle_invocation_matches_timer_driven() {
        let mut scheduler = seeded_scheduler();
        scheduler.request_add_device();

        scheduler.run_verification_cycle();
        assert_eq!(scheduler.counters().verifications(), 1);
        assert_eq!(highlighted_count(&scheduler), 1);

        // The manually-run cycle scheduled its own deferred clear
        scheduler.advance(1500);
        assert_eq!(highlighted_count(&scheduler), 0);
    }

    #[test]
    fn test_one_event_per_committed_mutation() {
        let (mut scheduler, events) = recording_scheduler();

        scheduler.request_add_device();
        assert_eq!(events.borrow().len(), 1);
        assert!(matches!(
            &events.borrow()[0].1,
            Event::ParticipantJoined { .. }
        ));

        // A cycle is two mutations: the counter update and the highlight
        scheduler.run_verification_cycle();
        assert_eq!(events.borrow().len(), 3);
        assert!(matches!(
            &events.borrow()[1].1,
            Event::VerificationRun { .. }
        ));
        assert!(matches!(
            &events.borrow()[2].1,
            Event::ConnectionHighlighted { .. }
        ));

        // The deferred clear is one more; a second clear emits nothing
        scheduler.advance(1500);
        assert_eq!(events.borrow().len(), 4);
        assert!(matches!(
            &events.borrow()[3].1,
            Event::HighlightCleared { connections: 1 }
        ));
        scheduler.advance(1500);
        assert_eq!(events.borrow().len(), 4);
    }

    #[test]
    fn test_fixed_seed_reproduces_the_session() {
        let run = |seed: [u8; 32]| {
            let mut scheduler = NsScheduler::new(SchedulerConfig {
                seed: Some(seed),
                ..Default::default()
            });
            scheduler.start(3000);
            for _ in 0..20 {
                scheduler.request_add_device();
                scheduler.advance(1000);
            }
            let snapshot = scheduler.snapshot();
            (
                snapshot
                    .participants
                    .iter()
                    .map(|p| (p.id.clone(), p.kind))
                    .collect::<Vec<_>>(),
                snapshot
                    .connections
                    .iter()
                    .map(|c| c.id.clone())
                    .collect::<Vec<_>>(),
            )
        };

        assert_eq!(run([3u8; 32]), run([3u8; 32]));
    }

    #[test]
    fn test_time_never_moves_backwards() {
        let mut scheduler = seeded_scheduler();
        scheduler.advance_to(5000);
        scheduler.advance_to(1000);
        assert_eq!(scheduler.now(), 5000);
    }
}
