// Graph store: the single source of truth for participants and connections.
//
// All structural mutation goes through this module so the invariants hold
// atomically from the caller's perspective: ids stay unique, the hub exists
// exactly once, and every non-hub participant carries exactly one hub link.
// Maps are insertion-ordered (IndexMap), which keeps snapshots stable for
// rendering and gives O(1) index access for uniform random selection.

use indexmap::IndexMap;
use log::{debug, warn};
use rand::Rng;

use crate::ns_interface::{
    connection_id, Connection, ConnectionId, DeviceKind, Event, EventSink, LinkKind, Participant,
    ParticipantId, Position, SimTime, HUB_ID, HUB_LABEL, HUB_POSITION, PEER_LINK_PROBABILITY,
    SPAWN_X_MAX, SPAWN_X_MIN, SPAWN_Y_MAX, SPAWN_Y_MIN,
};

// ============================================================================
// Snapshot
// ============================================================================

/// Point-in-time copy of the graph for rendering
///
/// Owned clones in insertion order; the caller may hold it across later
/// mutations without observing them.
#[derive(Clone, Debug, Default)]
pub struct GraphSnapshot {
    pub participants: Vec<Participant>,
    pub connections: Vec<Connection>,
}

// ============================================================================
// Graph Store
// ============================================================================

pub struct NsGraph {
    // Hub is inserted first and never removed, so it always sits at index 0
    participants: IndexMap<ParticipantId, Participant>,
    connections: IndexMap<ConnectionId, Connection>,
    // Monotonic sequence for id/label allocation; the hub counts as 1
    next_seq: u64,
}

impl NsGraph {
    /// Create a graph holding only the central hub
    pub fn new() -> Self {
        let hub = Participant {
            id: HUB_ID.to_string(),
            kind: DeviceKind::Browser,
            label: HUB_LABEL.to_string(),
            position: HUB_POSITION,
        };

        let mut participants = IndexMap::new();
        participants.insert(hub.id.clone(), hub);

        Self {
            participants,
            connections: IndexMap::new(),
            next_seq: 1,
        }
    }

    /// Add one device participant with its mandatory hub link
    ///
    /// With probability [`PEER_LINK_PROBABILITY`] - evaluated only when at
    /// least one other device already exists - the new device also links to
    /// a uniformly random existing device. Emits one `ParticipantJoined`
    /// event on success.
    ///
    /// Returns `None` without mutating anything if the allocated id already
    /// exists. Ids come from a monotonic counter, so this is an internal
    /// invariant violation: it is logged, never surfaced as a failure.
    pub fn add_participant(
        &mut self,
        now: SimTime,
        rng: &mut impl Rng,
        sink: &mut dyn EventSink,
    ) -> Option<Participant> {
        let seq = self.next_seq + 1;
        let id: ParticipantId = format!("device-{}", seq);

        if self.participants.contains_key(&id) {
            warn!("participant id {} already exists, dropping join", id);
            return None;
        }

        let kind = DeviceKind::ALL[rng.gen_range(0..DeviceKind::ALL.len())];
        let participant = Participant {
            id: id.clone(),
            kind,
            label: format!("{} {}", kind.label(), seq),
            position: Position {
                x: rng.gen_range(SPAWN_X_MIN..SPAWN_X_MAX),
                y: rng.gen_range(SPAWN_Y_MIN..SPAWN_Y_MAX),
            },
        };

        let hub_link = Connection {
            id: connection_id(&id, HUB_ID),
            source: id.clone(),
            target: HUB_ID.to_string(),
            kind: LinkKind::Hub,
            highlighted: false,
        };

        // Optional peer link to an existing device (hub at index 0 excluded)
        let peer_link = if self.participants.len() > 1 && rng.gen_bool(PEER_LINK_PROBABILITY) {
            self.participants
                .get_index(rng.gen_range(1..self.participants.len()))
                .map(|(peer_id, _)| Connection {
                    id: connection_id(&id, peer_id),
                    source: id.clone(),
                    target: peer_id.clone(),
                    kind: LinkKind::Peer,
                    highlighted: false,
                })
        } else {
            None
        };

        self.next_seq = seq;
        self.participants.insert(id.clone(), participant.clone());
        self.connections.insert(hub_link.id.clone(), hub_link);
        let peer_link = peer_link.map(|link| {
            let link_id = link.id.clone();
            self.connections.insert(link_id.clone(), link);
            link_id
        });

        sink.log(
            now,
            Event::ParticipantJoined {
                id,
                kind,
                peer_link,
            },
        );

        Some(participant)
    }

    /// Highlight one connection chosen uniformly at random
    ///
    /// The highlight moves: any previously highlighted connection is reset
    /// first, so exactly one connection is highlighted at a time. Returns
    /// `None` and leaves the graph untouched when no connections exist.
    pub fn highlight_random_edge(
        &mut self,
        now: SimTime,
        rng: &mut impl Rng,
        sink: &mut dyn EventSink,
    ) -> Option<ConnectionId> {
        if self.connections.is_empty() {
            debug!("no connections to verify yet");
            return None;
        }

        for connection in self.connections.values_mut() {
            connection.highlighted = false;
        }

        let index = rng.gen_range(0..self.connections.len());
        let (id, connection) = self.connections.get_index_mut(index)?;
        connection.highlighted = true;
        let id = id.clone();

        sink.log(now, Event::ConnectionHighlighted { id: id.clone() });
        Some(id)
    }

    /// Reset every connection to `highlighted = false`
    ///
    /// Idempotent. Emits a `HighlightCleared` event only when something was
    /// actually highlighted, so observers see one notification per mutation.
    pub fn clear_highlight(&mut self, now: SimTime, sink: &mut dyn EventSink) {
        let mut cleared = 0;
        for connection in self.connections.values_mut() {
            if connection.highlighted {
                connection.highlighted = false;
                cleared += 1;
            }
        }

        if cleared > 0 {
            sink.log(now, Event::HighlightCleared { connections: cleared });
        }
    }

    /// Consistent read of the current graph state
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            participants: self.participants.values().cloned().collect(),
            connections: self.connections.values().cloned().collect(),
        }
    }

    pub fn num_participants(&self) -> usize {
        self.participants.len()
    }

    pub fn num_connections(&self) -> usize {
        self.connections.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.participants.contains_key(id)
    }

    /// Connections originating at the given participant
    pub fn connections_from(&self, id: &str) -> Vec<&Connection> {
        self.connections
            .values()
            .filter(|connection| connection.source == id)
            .collect()
    }
}

impl Default for NsGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ns_interface::NoOpSink;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded_rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_new_graph_holds_only_the_hub() {
        let graph = NsGraph::new();

        assert_eq!(graph.num_participants(), 1);
        assert_eq!(graph.num_connections(), 0);
        assert!(graph.contains(HUB_ID));

        let snapshot = graph.snapshot();
        assert_eq!(snapshot.participants[0].id, HUB_ID);
        assert_eq!(snapshot.participants[0].label, HUB_LABEL);
    }

    #[test]
    fn test_every_device_gets_exactly_one_hub_link() {
        let mut graph = NsGraph::new();
        let mut rng = seeded_rng();
        let mut sink = NoOpSink;

        for _ in 0..50 {
            assert!(graph.add_participant(0, &mut rng, &mut sink).is_some());
        }

        assert_eq!(graph.num_participants(), 51);

        for participant in graph.snapshot().participants {
            if participant.id == HUB_ID {
                continue;
            }
            let hub_links = graph
                .connections_from(&participant.id)
                .into_iter()
                .filter(|c| c.kind == LinkKind::Hub && c.target == HUB_ID)
                .count();
            assert_eq!(hub_links, 1, "device {} hub links", participant.id);
        }
    }

    #[test]
    fn test_ids_and_labels_follow_the_sequence() {
        let mut graph = NsGraph::new();
        let mut rng = seeded_rng();
        let mut sink = NoOpSink;

        // Hub is seq 1, so the first device is device-2
        let first = graph.add_participant(0, &mut rng, &mut sink).unwrap();
        assert_eq!(first.id, "device-2");
        assert_eq!(first.label, format!("{} 2", first.kind.label()));

        let second = graph.add_participant(0, &mut rng, &mut sink).unwrap();
        assert_eq!(second.id, "device-3");
    }

    #[test]
    fn test_positions_stay_inside_the_spawn_viewport() {
        let mut graph = NsGraph::new();
        let mut rng = seeded_rng();
        let mut sink = NoOpSink;

        for _ in 0..200 {
            let participant = graph.add_participant(0, &mut rng, &mut sink).unwrap();
            let position = participant.position;
            assert!(position.x >= SPAWN_X_MIN && position.x < SPAWN_X_MAX);
            assert!(position.y >= SPAWN_Y_MIN && position.y < SPAWN_Y_MAX);
        }
    }

    #[test]
    fn test_no_self_links_and_no_peer_links_to_the_hub() {
        let mut graph = NsGraph::new();
        let mut rng = seeded_rng();
        let mut sink = NoOpSink;

        for _ in 0..2000 {
            graph.add_participant(0, &mut rng, &mut sink);
        }

        for connection in graph.snapshot().connections {
            assert_ne!(connection.source, connection.target);
            if connection.kind == LinkKind::Peer {
                assert_ne!(connection.target, HUB_ID);
            }
        }
    }

    #[test]
    fn test_peer_link_frequency_converges_to_probability() {
        let mut graph = NsGraph::new();
        let mut rng = seeded_rng();
        let mut sink = NoOpSink;

        // Establish a pool of devices first so the peer roll is always taken
        graph.add_participant(0, &mut rng, &mut sink);
        graph.add_participant(0, &mut rng, &mut sink);

        let trials = 10_000;
        let mut peer_links = 0;
        for _ in 0..trials {
            let before = graph.num_connections();
            graph.add_participant(0, &mut rng, &mut sink);
            // Two new connections means the hub link plus a peer link
            if graph.num_connections() == before + 2 {
                peer_links += 1;
            }
        }

        let fraction = peer_links as f64 / trials as f64;
        assert!(
            (0.08..=0.12).contains(&fraction),
            "peer link fraction {} outside tolerance",
            fraction
        );
    }

    #[test]
    fn test_first_device_never_rolls_a_peer_link() {
        // With only the hub present there is no peer candidate, so the very
        // first join must produce exactly one connection no matter the rng.
        for seed in 0..20 {
            let mut graph = NsGraph::new();
            let mut rng = StdRng::seed_from_u64(seed);
            let mut sink = NoOpSink;
            graph.add_participant(0, &mut rng, &mut sink);
            assert_eq!(graph.num_connections(), 1);
        }
    }

    #[test]
    fn test_highlight_on_empty_graph_is_a_no_op() {
        let mut graph = NsGraph::new();
        let mut rng = seeded_rng();
        let mut sink = NoOpSink;

        assert!(graph
            .highlight_random_edge(0, &mut rng, &mut sink)
            .is_none());
        assert_eq!(graph.num_connections(), 0);
    }

    #[test]
    fn test_highlight_moves_instead_of_stacking() {
        let mut graph = NsGraph::new();
        let mut rng = seeded_rng();
        let mut sink = NoOpSink;

        for _ in 0..10 {
            graph.add_participant(0, &mut rng, &mut sink);
        }

        for _ in 0..25 {
            assert!(graph
                .highlight_random_edge(0, &mut rng, &mut sink)
                .is_some());
            let highlighted = graph
                .snapshot()
                .connections
                .iter()
                .filter(|c| c.highlighted)
                .count();
            assert_eq!(highlighted, 1);
        }
    }

    #[test]
    fn test_highlight_then_clear_round_trip() {
        let mut graph = NsGraph::new();
        let mut rng = seeded_rng();
        let mut sink = NoOpSink;

        for _ in 0..5 {
            graph.add_participant(0, &mut rng, &mut sink);
        }

        let highlighted = graph.highlight_random_edge(0, &mut rng, &mut sink);
        assert!(highlighted.is_some());

        graph.clear_highlight(0, &mut sink);
        assert!(graph.snapshot().connections.iter().all(|c| !c.highlighted));

        // Idempotent: a second clear changes nothing
        graph.clear_highlight(0, &mut sink);
        assert!(graph.snapshot().connections.iter().all(|c| !c.highlighted));
    }

    #[test]
    fn test_snapshot_is_a_point_in_time_copy() {
        let mut graph = NsGraph::new();
        let mut rng = seeded_rng();
        let mut sink = NoOpSink;

        graph.add_participant(0, &mut rng, &mut sink);
        let before = graph.snapshot();

        graph.add_participant(0, &mut rng, &mut sink);
        graph.highlight_random_edge(0, &mut rng, &mut sink);

        // The earlier snapshot does not observe later mutations
        assert_eq!(before.participants.len(), 2);
        assert!(before.connections.iter().all(|c| !c.highlighted));
    }
}
