use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use arq_lab_abstract::{ArqEndpoint, Message, SenderConfig, SimConfig};
use arq_lab_sender::{GoBackNSender, StopAndWaitSender};
use arq_lab_simulator::{
    AlternatingBitReceiver, CumulativeAckReceiver, SimulationReport, Simulator, scenario_runner,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Variant {
    /// Window of one, alternating sequence bit.
    StopAndWait,
    /// Bounded window, cumulative acks, full-window resend on timeout.
    GoBackN,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless ARQ sender simulator")]
struct Args {
    /// Sender variant to exercise.
    #[arg(long, value_enum, default_value_t = Variant::GoBackN)]
    variant: Variant,

    /// Load a scenario from disk instead of the default run.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Write a JSON trace of the finished simulation.
    #[arg(long)]
    trace_out: Option<PathBuf>,

    /// Window size for the Go-Back-N sender.
    #[arg(long, default_value_t = 8)]
    window_size: u32,

    /// Channel loss rate for the default run.
    #[arg(long, default_value_t = 0.1)]
    loss_rate: f64,

    /// Channel RNG seed for the default run.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();
    info!("arq-lab-sim-cli starting…");

    let (sender, receiver) = build_pair(&args);

    let report = if let Some(path) = &args.scenario {
        let path = path
            .to_str()
            .context("Scenario path contains invalid UTF-8")?;
        scenario_runner::run_scenario(path, sender, receiver)?
    } else {
        run_default_sim(&args, sender, receiver)
    };

    info!(
        "Done: {} packets sent, {} messages delivered in {}ms",
        report.sender_packet_count,
        report.delivered_data.len(),
        report.duration_ms
    );

    if let Some(trace_path) = &args.trace_out {
        write_trace(trace_path, &report)?;
    }

    Ok(())
}

fn build_pair(args: &Args) -> (Box<dyn ArqEndpoint>, Box<dyn ArqEndpoint>) {
    let config = SenderConfig {
        window_size: args.window_size,
        ..SenderConfig::default()
    };
    match args.variant {
        Variant::StopAndWait => (
            Box::new(StopAndWaitSender::new(config)),
            Box::new(AlternatingBitReceiver::new()),
        ),
        Variant::GoBackN => (
            Box::new(GoBackNSender::new(config)),
            Box::new(CumulativeAckReceiver::new()),
        ),
    }
}

fn run_default_sim(
    args: &Args,
    sender: Box<dyn ArqEndpoint>,
    receiver: Box<dyn ArqEndpoint>,
) -> SimulationReport {
    // Latencies stay below the senders' fixed 40ms timeout so retransmissions
    // come from channel loss, not from acks outrunning the timer.
    let config = SimConfig {
        loss_rate: args.loss_rate,
        min_latency: 5,
        max_latency: 15,
        seed: args.seed,
        ..SimConfig::default()
    };
    let mut sim = Simulator::new(config, sender, receiver);
    sim.schedule_app_send(100, Message::new(*b"Packet 1"));
    sim.schedule_app_send(200, Message::new(*b"Packet 2"));
    sim.schedule_app_send(300, Message::new(*b"Packet 3"));

    info!("Starting default headless simulation…");
    sim.run_until_complete();
    info!("Simulation complete.");
    sim.export_report()
}

fn write_trace(path: &Path, report: &SimulationReport) -> Result<()> {
    let data = serde_json::to_vec_pretty(report).context("Failed to serialize simulation trace")?;
    fs::write(path, &data)
        .with_context(|| format!("Failed to write trace file {}", path.display()))?;
    Ok(())
}
