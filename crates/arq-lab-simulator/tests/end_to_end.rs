use arq_lab_abstract::{ArqEndpoint, Message, SenderConfig, SimConfig};
use arq_lab_sender::{GoBackNSender, StopAndWaitSender};
use arq_lab_simulator::{AlternatingBitReceiver, CumulativeAckReceiver, Simulator, scenario_runner};

fn fixed_latency(latency: u64, seed: u64) -> SimConfig {
    SimConfig {
        min_latency: latency,
        max_latency: latency,
        seed,
        ..SimConfig::default()
    }
}

fn stop_and_wait_pair() -> (Box<dyn ArqEndpoint>, Box<dyn ArqEndpoint>) {
    (
        Box::new(StopAndWaitSender::new(SenderConfig::default())),
        Box::new(AlternatingBitReceiver::new()),
    )
}

fn go_back_n_pair(window_size: u32) -> (Box<dyn ArqEndpoint>, Box<dyn ArqEndpoint>) {
    (
        Box::new(GoBackNSender::new(SenderConfig {
            window_size,
            ..SenderConfig::default()
        })),
        Box::new(CumulativeAckReceiver::new()),
    )
}

#[test]
fn stop_and_wait_clean_channel_single_exchange() {
    let (sender, receiver) = stop_and_wait_pair();
    let mut sim = Simulator::new(fixed_latency(10, 1), sender, receiver);
    sim.schedule_app_send(0, Message::new(*b"HI"));

    sim.run_until_complete();

    assert_eq!(sim.delivered_data, vec![b"HI".to_vec()]);
    // Single transmission, no retransmissions on a clean channel.
    assert_eq!(sim.sender_packet_count, 1);
}

#[test]
fn stop_and_wait_recovers_from_a_dropped_ack() {
    let (sender, receiver) = stop_and_wait_pair();
    let mut sim = Simulator::new(fixed_latency(10, 1), sender, receiver);
    sim.schedule_app_send(0, Message::new(*b"HI"));
    sim.add_drop_receiver_ack_once(0);

    sim.run_until_complete();

    // Delivered exactly once despite the duplicate the retransmission causes.
    assert_eq!(sim.delivered_data, vec![b"HI".to_vec()]);
    assert_eq!(sim.sender_packet_count, 2);
}

#[test]
fn go_back_n_resends_only_the_remaining_window_after_partial_acks() {
    let (sender, receiver) = go_back_n_pair(8);
    let mut sim = Simulator::new(fixed_latency(10, 1), sender, receiver);
    for (i, data) in [&b"one"[..], b"two", b"three"].iter().enumerate() {
        sim.schedule_app_send(i as u64, Message::new(*data));
    }
    // seq 2 is lost on its first transmission; seq 0 and 1 get through and
    // their cumulative acks advance the base before the timer fires.
    sim.add_drop_sender_seq_once(2);

    sim.run_until_complete();

    assert_eq!(
        sim.delivered_data,
        vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]
    );
    // 3 initial transmissions + exactly one resend (seq 2, the in-flight
    // range [2, 3) at timeout).
    assert_eq!(sim.sender_packet_count, 4);
}

#[test]
fn go_back_n_delivers_everything_in_order_over_a_lossy_channel() {
    let (sender, receiver) = go_back_n_pair(8);
    let config = SimConfig {
        loss_rate: 0.2,
        corrupt_rate: 0.05,
        min_latency: 5,
        max_latency: 15,
        seed: 42,
        ..SimConfig::default()
    };
    let mut sim = Simulator::new(config, sender, receiver);
    let messages: Vec<Vec<u8>> = (0..5).map(|i| format!("msg-{i}").into_bytes()).collect();
    for (i, m) in messages.iter().enumerate() {
        sim.schedule_app_send(i as u64 * 100, Message::new(m.clone()));
    }

    sim.run_until_complete();

    assert_eq!(sim.delivered_data, messages);
}

#[test]
fn stop_and_wait_delivers_everything_in_order_over_a_lossy_channel() {
    let (sender, receiver) = stop_and_wait_pair();
    let config = SimConfig {
        loss_rate: 0.2,
        min_latency: 5,
        max_latency: 15,
        seed: 7,
        ..SimConfig::default()
    };
    let mut sim = Simulator::new(config, sender, receiver);
    // Spaced far enough apart that each message is acknowledged before the
    // next submit; Stop-and-Wait drops messages submitted while busy.
    let messages: Vec<Vec<u8>> = (0..3).map(|i| format!("msg-{i}").into_bytes()).collect();
    for (i, m) in messages.iter().enumerate() {
        sim.schedule_app_send(i as u64 * 1000, Message::new(m.clone()));
    }

    sim.run_until_complete();

    assert_eq!(sim.delivered_data, messages);
}

#[test]
fn shipped_scenarios_pass() {
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenarios");

    let (sender, receiver) = stop_and_wait_pair();
    scenario_runner::run_scenario(
        root.join("stop_and_wait_basic.toml").to_str().unwrap(),
        sender,
        receiver,
    )
    .unwrap();

    let (sender, receiver) = stop_and_wait_pair();
    scenario_runner::run_scenario(
        root.join("stop_and_wait_ack_drop.toml").to_str().unwrap(),
        sender,
        receiver,
    )
    .unwrap();

    let (sender, receiver) = go_back_n_pair(8);
    scenario_runner::run_scenario(
        root.join("go_back_n_loss.toml").to_str().unwrap(),
        sender,
        receiver,
    )
    .unwrap();
}
