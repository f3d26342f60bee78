// Session Simulator Statistics

use ns_rust::SimTime;

// ============================================================================
// Simulation Result
// ============================================================================

/// Complete session result
#[derive(Debug, Clone)]
pub struct SessionResult {
    /// Random seed used
    pub seed_used: [u8; 32],

    /// Total rounds executed
    pub total_rounds: usize,

    /// Final state after the last round (and the drained clear)
    pub final_sample: RoundSample,

    /// Historical samples (taken at sample_interval)
    pub history: Vec<RoundSample>,

    /// Change-event totals observed through the sink
    pub event_totals: EventTotals,
}

impl SessionResult {
    pub fn print_summary(&self) {
        println!("\n╔════════════════════════════════════════════════════════╗");
        println!("║  Session Summary                                       ║");
        println!("╚════════════════════════════════════════════════════════╝");
        println!("  Rounds:          {}", self.total_rounds);
        println!(
            "  Simulated time:  {:.1}s",
            self.final_sample.timestamp as f64 / 1000.0
        );
        println!("  Participants:    {}", self.final_sample.participants);
        println!(
            "  Connections:     {} ({} peer links)",
            self.final_sample.connections, self.final_sample.peer_links
        );
        println!("  Verifications:   {}", self.final_sample.verifications);
        println!("  Final load:      {}%", self.final_sample.load);
        println!(
            "  Events:          {} joins, {} cycles, {} highlights, {} clears",
            self.event_totals.joins,
            self.event_totals.cycles,
            self.event_totals.highlights,
            self.event_totals.clears
        );
        println!("  Seed:            {}", seed_hex(&self.seed_used));
    }
}

fn seed_hex(seed: &[u8; 32]) -> String {
    let mut out = String::with_capacity(2 + seed.len() * 2);
    out.push_str("0x");
    for byte in seed {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

// ============================================================================
// Round Samples
// ============================================================================

/// Metrics sampled at a single round
#[derive(Debug, Clone, Default)]
pub struct RoundSample {
    /// Round number
    pub round: usize,

    /// Simulated timestamp (ms)
    pub timestamp: SimTime,

    /// Participants including the hub
    pub participants: u64,

    /// Total connections
    pub connections: usize,

    /// Peer links among them
    pub peer_links: usize,

    /// Verification cycles so far
    pub verifications: u64,

    /// Load gauge (0-100)
    pub load: u8,
}

/// Totals of change events seen through the sink
#[derive(Debug, Clone, Copy, Default)]
pub struct EventTotals {
    pub joins: usize,
    pub cycles: usize,
    pub highlights: usize,
    pub clears: usize,
}
