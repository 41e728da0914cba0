use crate::trace::SimulationReport;
use arq_lab_abstract::{ArqEndpoint, Message, Packet, SimConfig, SystemContext};
use rand::Rng;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    Sender,
    Receiver,
}

impl NodeId {
    pub fn peer(&self) -> Self {
        match self {
            NodeId::Sender => NodeId::Receiver,
            NodeId::Receiver => NodeId::Sender,
        }
    }
}

#[derive(Debug)]
pub enum EventType {
    PacketArrival {
        to: NodeId,
        packet: Packet,
    },
    TimerExpiry {
        node: NodeId,
        generation: u64,
    },
    AppSend {
        message: Message,
    },
}

#[derive(Debug)]
struct Event {
    time: u64,
    event_type: EventType,
    id: u64, // Unique ID to differentiate events at same time
}

// Custom Ord for Min-Heap (smallest time pops first)
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.id == other.id
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse comparison for time: smallest time is Greater in BinaryHeap
        other
            .time
            .cmp(&self.time)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// A compact textual summary of important link-layer events.
#[derive(Debug, Clone, Serialize)]
pub struct LinkEventSummary {
    pub time: u64,
    pub description: String,
}

/// Actions buffered during an endpoint's handler call. The endpoint's side
/// effects are applied only after the handler returns, so a handler never
/// observes its own events.
#[derive(Default)]
struct ActionBuffer {
    outgoing_packets: Vec<Packet>,
    timer_starts: Vec<u64>,
    timer_stops: u32,
    logs: Vec<String>,
    delivered_data: Vec<Vec<u8>>,
}

/// Context implementation handed to an endpoint for one handler call.
struct ScopedContext<'a> {
    buffer: &'a mut ActionBuffer,
    now: u64,
}

impl<'a> SystemContext for ScopedContext<'a> {
    fn transmit(&mut self, packet: Packet) {
        self.buffer.outgoing_packets.push(packet);
    }

    fn start_timer(&mut self, delay_ms: u64) {
        self.buffer.timer_starts.push(delay_ms);
    }

    fn stop_timer(&mut self) {
        self.buffer.timer_stops += 1;
    }

    fn deliver_data(&mut self, data: &[u8]) {
        self.buffer.delivered_data.push(data.to_vec());
    }

    fn log(&mut self, message: &str) {
        self.buffer.logs.push(message.to_string());
    }

    fn now(&self) -> u64 {
        self.now
    }
}

pub struct Simulator {
    time: u64,
    event_queue: BinaryHeap<Event>,
    event_id_counter: u64,

    config: SimConfig,
    rng: rand::rngs::StdRng,

    // We hold the two nodes directly.
    // Box allows mixing endpoint implementations.
    pub sender: Box<dyn ArqEndpoint>,
    pub receiver: Box<dyn ArqEndpoint>,

    // Stats for assertions
    pub delivered_data: Vec<Vec<u8>>,
    pub sender_packet_count: u32,

    // Deterministic fault injection: drop first packet from Sender with given seq numbers
    drop_sender_seq_once: Vec<u32>,
    // Deterministic fault injection: drop first ACK from Receiver for given seq numbers
    drop_receiver_ack_once: Vec<u32>,

    /// Timeline of link events (sends, drops, corruptions, deliveries).
    pub link_events: Vec<LinkEventSummary>,

    /// Per-node timer generation. Each start or stop bumps the generation, so
    /// a queued expiry from a superseded or stopped timer is skipped.
    timer_generations: HashMap<NodeId, u64>,
}

impl Simulator {
    pub fn new(
        config: SimConfig,
        sender: Box<dyn ArqEndpoint>,
        receiver: Box<dyn ArqEndpoint>,
    ) -> Self {
        use rand::SeedableRng;
        let rng = rand::rngs::StdRng::seed_from_u64(config.seed);

        Self {
            time: 0,
            event_queue: BinaryHeap::new(),
            event_id_counter: 0,
            config,
            rng,
            sender,
            receiver,
            delivered_data: Vec::new(),
            sender_packet_count: 0,
            drop_sender_seq_once: Vec::new(),
            drop_receiver_ack_once: Vec::new(),
            link_events: Vec::new(),
            timer_generations: HashMap::new(),
        }
    }

    /// Register a deterministic fault: drop the first packet sent by Sender whose seq equals `seq`.
    pub fn add_drop_sender_seq_once(&mut self, seq: u32) {
        self.drop_sender_seq_once.push(seq);
    }

    /// Register a deterministic fault: drop the first ACK sent by Receiver whose seq equals `seq`.
    pub fn add_drop_receiver_ack_once(&mut self, seq: u32) {
        self.drop_receiver_ack_once.push(seq);
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    fn push_event(&mut self, time: u64, event_type: EventType) {
        self.event_queue.push(Event {
            time,
            event_type,
            id: self.event_id_counter,
        });
        self.event_id_counter += 1;
    }

    pub fn schedule_app_send(&mut self, time: u64, message: Message) {
        self.push_event(time, EventType::AppSend { message });
    }

    pub fn init(&mut self) {
        // Init phase
        {
            let mut buffer = ActionBuffer::default();
            let mut ctx = ScopedContext {
                buffer: &mut buffer,
                now: self.time,
            };
            self.sender.init(&mut ctx);
            self.process_actions(NodeId::Sender, buffer);
        }
        {
            let mut buffer = ActionBuffer::default();
            let mut ctx = ScopedContext {
                buffer: &mut buffer,
                now: self.time,
            };
            self.receiver.init(&mut ctx);
            self.process_actions(NodeId::Receiver, buffer);
        }
    }

    pub fn peek_next_event_time(&self) -> Option<u64> {
        self.event_queue.peek().map(|e| e.time)
    }

    pub fn current_time(&self) -> u64 {
        self.time
    }

    pub fn remaining_events(&self) -> usize {
        self.event_queue.len()
    }

    /// Process the next event. Returns true if an event was processed, false if queue is empty.
    pub fn step(&mut self) -> bool {
        let event = match self.event_queue.pop() {
            Some(e) => e,
            None => return false,
        };

        self.time = event.time;
        debug!("Processing event at {}: {:?}", self.time, event.event_type);

        match event.event_type {
            EventType::PacketArrival { to, packet } => {
                let mut buffer = ActionBuffer::default();
                {
                    let mut ctx = ScopedContext {
                        buffer: &mut buffer,
                        now: self.time,
                    };
                    match to {
                        NodeId::Sender => self.sender.on_packet(&mut ctx, packet),
                        NodeId::Receiver => self.receiver.on_packet(&mut ctx, packet),
                    }
                }
                self.process_actions(to, buffer);
            }
            EventType::TimerExpiry { node, generation } => {
                // The expiry is stale if the timer was stopped or restarted
                // after this event was queued.
                let current = self.timer_generations.get(&node).copied().unwrap_or(0);
                if current != generation {
                    debug!("Skipping superseded timer expiry for {:?}", node);
                    return true; // Event processed (by being ignored)
                }

                let mut buffer = ActionBuffer::default();
                {
                    let mut ctx = ScopedContext {
                        buffer: &mut buffer,
                        now: self.time,
                    };
                    match node {
                        NodeId::Sender => self.sender.on_timer(&mut ctx),
                        NodeId::Receiver => self.receiver.on_timer(&mut ctx),
                    }
                }
                self.process_actions(node, buffer);
            }
            EventType::AppSend { message } => {
                let mut buffer = ActionBuffer::default();
                {
                    let mut ctx = ScopedContext {
                        buffer: &mut buffer,
                        now: self.time,
                    };
                    self.sender.on_app_data(&mut ctx, message);
                }
                self.process_actions(NodeId::Sender, buffer);
            }
        }
        true
    }

    pub fn run_until_complete(&mut self) {
        self.init();
        while self.step() {}
    }

    /// Produce a serializable snapshot of the finished simulation.
    pub fn export_report(&self) -> SimulationReport {
        SimulationReport {
            config: self.config.clone(),
            duration_ms: self.time,
            delivered_data: self.delivered_data.clone(),
            sender_packet_count: self.sender_packet_count,
            link_events: self.link_events.clone(),
        }
    }

    fn process_actions(&mut self, source_node: NodeId, buffer: ActionBuffer) {
        for log in buffer.logs {
            info!("[{:?}] {}", source_node, log);
        }

        for data in buffer.delivered_data {
            info!("[{:?}] DELIVERED DATA: {} bytes", source_node, data.len());
            self.link_events.push(LinkEventSummary {
                time: self.time,
                description: format!(
                    "[{:?}] DELIVERED {} bytes to application",
                    source_node,
                    data.len()
                ),
            });
            self.delivered_data.push(data);
        }

        // Every stop and every start bumps the generation, invalidating any
        // queued expiry of the previous timer. A start therefore supersedes
        // a running timer on its own.
        for _ in 0..buffer.timer_stops {
            *self.timer_generations.entry(source_node).or_insert(0) += 1;
        }
        for delay in buffer.timer_starts {
            let generation = self.timer_generations.entry(source_node).or_insert(0);
            *generation += 1;
            let generation = *generation;
            self.push_event(
                self.time + delay,
                EventType::TimerExpiry {
                    node: source_node,
                    generation,
                },
            );
        }

        // Packet transmission logic (Channel)
        for mut packet in buffer.outgoing_packets {
            if source_node == NodeId::Sender {
                self.sender_packet_count += 1;

                // Deterministic tests: optionally drop first packet with given seq
                if let Some(pos) = self
                    .drop_sender_seq_once
                    .iter()
                    .position(|s| *s == packet.header.seq_num)
                {
                    self.link_events.push(LinkEventSummary {
                        time: self.time,
                        description: format!(
                            "[Sender->Receiver] DROP (deterministic) seq={}",
                            packet.header.seq_num
                        ),
                    });
                    debug!(
                        "Deterministically dropping sender packet with seq={}",
                        packet.header.seq_num
                    );
                    self.drop_sender_seq_once.remove(pos);
                    continue;
                }
            }

            if source_node == NodeId::Receiver {
                // Deterministic tests: optionally drop first ACK for given seq
                if let Some(pos) = self
                    .drop_receiver_ack_once
                    .iter()
                    .position(|s| *s == packet.header.seq_num)
                {
                    self.link_events.push(LinkEventSummary {
                        time: self.time,
                        description: format!(
                            "[Receiver->Sender] DROP (deterministic) ack seq={}",
                            packet.header.seq_num
                        ),
                    });
                    debug!(
                        "Deterministically dropping receiver ACK for seq={}",
                        packet.header.seq_num
                    );
                    self.drop_receiver_ack_once.remove(pos);
                    continue;
                }
            }

            // 1. Check Loss
            if self.rng.random::<f64>() < self.config.loss_rate {
                self.link_events.push(LinkEventSummary {
                    time: self.time,
                    description: format!(
                        "[{:?}->{:?}] DROP (random loss) seq={}",
                        source_node,
                        source_node.peer(),
                        packet.header.seq_num
                    ),
                });
                debug!("Packet lost in channel");
                continue;
            }

            // 2. Check Corruption
            if self.rng.random::<f64>() < self.config.corrupt_rate {
                self.link_events.push(LinkEventSummary {
                    time: self.time,
                    description: format!(
                        "[{:?}->{:?}] CORRUPT seq={}",
                        source_node,
                        source_node.peer(),
                        packet.header.seq_num
                    ),
                });
                debug!("Packet corrupted in channel");
                // Simple corruption: flip the checksum to make it invalid
                packet.header.checksum = !packet.header.checksum;
            }

            // 3. Calculate Latency
            let latency = self
                .rng
                .random_range(self.config.min_latency..=self.config.max_latency);
            let arrival_time = self.time + latency;

            // 4. Target Node
            let target_node = source_node.peer();

            self.link_events.push(LinkEventSummary {
                time: self.time,
                description: format!(
                    "[{:?}->{:?}] SEND seq={} (latency={}ms)",
                    source_node, target_node, packet.header.seq_num, latency
                ),
            });

            self.push_event(
                arrival_time,
                EventType::PacketArrival {
                    to: target_node,
                    packet,
                },
            );
        }
    }
}
