use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use simple_logger::SimpleLogger;

use ns_rust::{
    Event, EventSink, NsScheduler, SchedulerConfig, SimTime, HIGHLIGHT_CLEAR_MS,
    VERIFY_INTERVAL_MS,
};

/// Sink that logs every change event; stands in for a rendering layer
struct LogSink;

impl EventSink for LogSink {
    fn log(&mut self, time: SimTime, event: Event) {
        match event {
            Event::ParticipantJoined {
                id,
                kind,
                peer_link,
            } => match peer_link {
                Some(link) => info!("{}: join {} ({:?}) + peer link {}", time, id, kind, link),
                None => info!("{}: join {} ({:?})", time, id, kind),
            },
            Event::VerificationRun { sequence, load } => {
                info!("{}: verification #{} load: {}%", time, sequence, load)
            }
            Event::ConnectionHighlighted { id } => info!("{}: highlight {}", time, id),
            Event::HighlightCleared { connections } => {
                info!("{}: clear ({} connection(s))", time, connections)
            }
        }
    }
}

fn main() {
    SimpleLogger::new().init().unwrap();

    info!("starting");

    let rounds = 40;
    let round_ms: SimTime = 500;
    let join_probability = 0.25;

    let mut seed = [0u8; 32];
    rand::thread_rng().fill(&mut seed);

    let mut scheduler = NsScheduler::new_with_sink(
        SchedulerConfig {
            seed: Some(seed),
            ..Default::default()
        },
        Box::new(LogSink),
    );

    // Driver decisions come from a separate rng so the engine stream stays
    // reproducible from the seed alone
    let mut rng = StdRng::from_seed(seed);

    scheduler.start(VERIFY_INTERVAL_MS);
    for _ in 0..rounds {
        if rng.gen_bool(join_probability) {
            scheduler.request_add_device();
        }
        scheduler.advance(round_ms);
    }

    scheduler.stop();
    // let the last deferred clear drain before reading final state
    scheduler.advance(HIGHLIGHT_CLEAR_MS);

    let snapshot = scheduler.snapshot();
    let counters = scheduler.counters();

    info!("let seed = {:?};", scheduler.seed());
    info!(
        "done. participants: {} connections: {} verifications: {} load: {}%",
        counters.participants(),
        snapshot.connections.len(),
        counters.verifications(),
        counters.load()
    );
}
