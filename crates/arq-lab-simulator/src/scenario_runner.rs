use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;
use tracing::info;

use arq_lab_abstract::{ArqEndpoint, Message, SimConfig, TestAction, TestAssertion, TestScenario};

use crate::engine::Simulator;
use crate::trace::SimulationReport;

pub fn load_scenario(path: &Path) -> Result<TestScenario> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
    let scenario: TestScenario =
        toml::from_str(&content).context("Failed to parse scenario file")?;
    Ok(scenario)
}

pub fn configure_actions(sim: &mut Simulator, actions: &[TestAction]) {
    for action in actions {
        match action {
            TestAction::AppSend { time, data } => {
                sim.schedule_app_send(*time, Message::new(data.as_bytes()));
            }
            TestAction::DropNextFromSenderSeq { seq } => {
                sim.add_drop_sender_seq_once(*seq);
            }
            TestAction::DropNextFromReceiverAck { seq } => {
                sim.add_drop_receiver_ack_once(*seq);
            }
        }
    }
}

/// Load a scenario, run it to completion and verify its assertions.
pub fn run_scenario(
    path: &str,
    sender: Box<dyn ArqEndpoint>,
    receiver: Box<dyn ArqEndpoint>,
) -> Result<SimulationReport> {
    let scenario = load_scenario(Path::new(path))?;

    let mut config = SimConfig::default();
    scenario.config.apply_to(&mut config);

    let mut sim = Simulator::new(config, sender, receiver);
    configure_actions(&mut sim, &scenario.actions);

    info!("Running scenario '{}': {}", scenario.name, scenario.description);
    sim.run_until_complete();

    let report = sim.export_report();
    check_assertions(&scenario, &report)?;
    info!("Scenario '{}' passed", scenario.name);
    Ok(report)
}

fn check_assertions(scenario: &TestScenario, report: &SimulationReport) -> Result<()> {
    for assertion in &scenario.assertions {
        match assertion {
            TestAssertion::DataDelivered { data } => {
                if !report
                    .delivered_data
                    .iter()
                    .any(|d| d.as_slice() == data.as_bytes())
                {
                    bail!(
                        "scenario '{}': expected data {:?} was never delivered",
                        scenario.name,
                        data
                    );
                }
            }
            TestAssertion::SenderPacketCount { min, max } => {
                let count = report.sender_packet_count;
                if count < *min {
                    bail!(
                        "scenario '{}': sender sent {} packets, expected at least {}",
                        scenario.name,
                        count,
                        min
                    );
                }
                if let Some(max) = max
                    && count > *max
                {
                    bail!(
                        "scenario '{}': sender sent {} packets, expected at most {}",
                        scenario.name,
                        count,
                        max
                    );
                }
            }
            TestAssertion::MaxDuration { ms } => {
                if report.duration_ms > *ms {
                    bail!(
                        "scenario '{}': finished at {}ms, expected within {}ms",
                        scenario.name,
                        report.duration_ms,
                        ms
                    );
                }
            }
        }
    }
    Ok(())
}
