// Session Simulator Runner

use std::cell::RefCell;
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use ns_rust::{Event, EventSink, LinkKind, NsScheduler, SchedulerConfig, SimTime};

use super::config::{SessionConfig, SessionEvent};
use super::stats::{EventTotals, RoundSample, SessionResult};

/// Sink that tallies change events, shared with the runner
struct CountingSink {
    totals: Rc<RefCell<EventTotals>>,
}

impl EventSink for CountingSink {
    fn log(&mut self, _time: SimTime, event: Event) {
        let mut totals = self.totals.borrow_mut();
        match event {
            Event::ParticipantJoined { .. } => totals.joins += 1,
            Event::VerificationRun { .. } => totals.cycles += 1,
            Event::ConnectionHighlighted { .. } => totals.highlights += 1,
            Event::HighlightCleared { .. } => totals.clears += 1,
        }
    }
}

/// Drives one whole session round by round on the logical clock
pub struct SessionRunner {
    config: SessionConfig,
    rng: StdRng,
    seed: [u8; 32],
    scheduler: NsScheduler,
    totals: Rc<RefCell<EventTotals>>,
    history: Vec<RoundSample>,
}

impl SessionRunner {
    pub fn new(config: SessionConfig) -> Self {
        let seed = config.seed.unwrap_or_else(|| {
            let mut seed = [0u8; 32];
            rand::thread_rng().fill(&mut seed);
            seed
        });

        let totals = Rc::new(RefCell::new(EventTotals::default()));
        let sink = CountingSink {
            totals: Rc::clone(&totals),
        };

        let scheduler = NsScheduler::new_with_sink(
            SchedulerConfig {
                verify_interval_ms: config.verify_interval_ms,
                highlight_clear_ms: config.highlight_clear_ms,
                seed: Some(seed),
            },
            Box::new(sink),
        );

        Self {
            rng: StdRng::from_seed(seed),
            seed,
            scheduler,
            totals,
            history: Vec::new(),
            config,
        }
    }

    /// Run the session to completion
    pub fn run(mut self) -> SessionResult {
        self.scheduler.start(self.config.verify_interval_ms);

        for round in 0..self.config.rounds {
            self.apply_scheduled_events(round);

            if self.rng.gen_bool(self.config.join_probability) {
                self.scheduler.request_add_device();
            }

            self.scheduler.advance(self.config.round_ms);

            if self.config.sample_interval > 0 && round % self.config.sample_interval == 0 {
                let sample = self.sample(round);
                self.history.push(sample);
            }
        }

        self.scheduler.stop();
        // drain the last deferred clear so the final sample is at rest
        self.scheduler.advance(self.config.highlight_clear_ms);

        let final_sample = self.sample(self.config.rounds);
        SessionResult {
            seed_used: self.seed,
            total_rounds: self.config.rounds,
            final_sample,
            history: self.history,
            event_totals: *self.totals.borrow(),
        }
    }

    fn apply_scheduled_events(&mut self, round: usize) {
        let due: Vec<SessionEvent> = self
            .config
            .events
            .events
            .iter()
            .filter(|scheduled| scheduled.round == round)
            .map(|scheduled| scheduled.event.clone())
            .collect();

        for event in due {
            match event {
                SessionEvent::AddDevices { count } => {
                    for _ in 0..count {
                        self.scheduler.request_add_device();
                    }
                }
                SessionEvent::StopVerifier => self.scheduler.stop(),
                SessionEvent::StartVerifier { interval_ms } => self.scheduler.start(interval_ms),
                SessionEvent::ReportStats { label } => {
                    let sample = self.sample(round);
                    let suffix = label.map(|l| format!("  ({})", l)).unwrap_or_default();
                    println!(
                        "  [round {}] {} participants, {} connections, {} verifications, load {}%{}",
                        round,
                        sample.participants,
                        sample.connections,
                        sample.verifications,
                        sample.load,
                        suffix
                    );
                }
            }
        }
    }

    fn sample(&self, round: usize) -> RoundSample {
        let snapshot = self.scheduler.snapshot();
        let counters = self.scheduler.counters();
        RoundSample {
            round,
            timestamp: self.scheduler.now(),
            participants: counters.participants(),
            connections: snapshot.connections.len(),
            peer_links: snapshot
                .connections
                .iter()
                .filter(|c| c.kind == LinkKind::Peer)
                .count(),
            verifications: counters.verifications(),
            load: counters.load(),
        }
    }
}
