// Fixed Seed Session - verify that a pinned seed reproduces a session
//
// Runs the same configuration twice from one seed and compares the
// resulting structure. Useful as a quick regression check when touching
// the engine's rng consumption order.

mod session;

use session::{SessionConfig, SessionRunner};

fn main() {
    println!("Fixed seed session check\n");

    let seed = [11u8; 32];

    let run = || {
        let mut config = SessionConfig::default();
        config.rounds = 300;
        config.join_probability = 0.25;
        config.seed = Some(seed);
        config.sample_interval = 0;
        SessionRunner::new(config).run()
    };

    let first = run();
    let second = run();

    println!("run 1:");
    first.print_summary();
    println!("\nrun 2:");
    second.print_summary();

    let identical = first.final_sample.participants == second.final_sample.participants
        && first.final_sample.connections == second.final_sample.connections
        && first.final_sample.peer_links == second.final_sample.peer_links
        && first.final_sample.verifications == second.final_sample.verifications
        && first.final_sample.load == second.final_sample.load;

    if identical {
        println!("\n✓ Sessions identical - seed reproduces the run");
    } else {
        println!("\n✗ Sessions diverged - rng consumption order changed!");
        std::process::exit(1);
    }
}
