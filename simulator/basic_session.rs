// Basic Session Simulator Example

mod session;

use session::{ScheduledEvent, SessionConfig, SessionEvent, SessionRunner};

fn main() {
    println!("╔════════════════════════════════════════════════════════╗");
    println!("║    Network Session Simulator                           ║");
    println!("╚════════════════════════════════════════════════════════╝\n");

    // Create configuration
    let mut config = SessionConfig::default();

    // Customize for the demo: a longer session with a visible join rate
    config.rounds = 400;
    config.round_ms = 250;
    config.join_probability = 0.2;

    // Add scheduled events to monitor progress
    config.events.events = vec![
        ScheduledEvent {
            round: 100,
            event: SessionEvent::ReportStats {
                label: Some("quarter mark".to_string()),
            },
        },
        ScheduledEvent {
            round: 200,
            event: SessionEvent::AddDevices { count: 10 },
        },
        ScheduledEvent {
            round: 201,
            event: SessionEvent::ReportStats {
                label: Some("after join burst".to_string()),
            },
        },
        ScheduledEvent {
            round: 300,
            event: SessionEvent::ReportStats {
                label: Some("near end of session".to_string()),
            },
        },
    ];

    println!("Starting session...");
    println!("  Rounds: {}", config.rounds);
    println!("  Round length: {}ms", config.round_ms);
    println!("  Join probability: {}\n", config.join_probability);

    // Run simulation
    let runner = SessionRunner::new(config);
    let result = runner.run();

    // Print results
    result.print_summary();

    println!("\n✓ Session complete!");
}
