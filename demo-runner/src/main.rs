use anyhow::Result;
use clap::Parser;
use log::info;
use replica_core::channel::{MemoryLink, PhoneLink, SessionChannel};
use replica_core::model::PrinterRecord;
use replica_core::registry::SubscriberRegistry;
use replica_core::store::RecordStore;
use selection_controller::{PrinterDisplay, SelectionController, VisibilityHost};
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "demo-runner")]
#[command(about = "End-to-end demo of the watch-side printer selection controller")]
struct Cli {
    /// Number of printers seeded on the simulated phone
    #[arg(short, long, default_value_t = 3)]
    printers: usize,

    /// Simulated phone round-trip latency in milliseconds
    #[arg(short, long, default_value_t = 150)]
    latency_ms: u64,
}

/// Display collaborator that just logs what a real widget would render.
struct LogDisplay;

impl PrinterDisplay for LogDisplay {
    fn set_awaiting_sync_indicator(&mut self, visible: bool) {
        info!("display: awaiting-sync indicator {}", on_off(visible));
    }
    fn set_refresh_affordance_visible(&mut self, visible: bool) {
        info!("display: refresh button {}", on_off(visible));
    }
    fn set_refresh_affordance_enabled(&mut self, enabled: bool) {
        info!(
            "display: refresh button {}",
            if enabled { "enabled" } else { "disabled" }
        );
    }
    fn set_row_count(&mut self, rows: usize) {
        info!("display: {} rows", rows);
    }
    fn set_row_label(&mut self, row: usize, label: &str) {
        info!("display: row {} label '{}'", row, label);
    }
    fn set_row_checkmark(&mut self, row: usize, visible: bool) {
        if visible {
            info!("display: row {} checkmark", row);
        }
    }
}

struct AlwaysVisible;

impl VisibilityHost for AlwaysVisible {
    fn is_currently_visible(&self) -> bool {
        true
    }
}

fn on_off(visible: bool) -> &'static str {
    if visible {
        "shown"
    } else {
        "hidden"
    }
}

fn seed_printers(count: usize) -> Vec<PrinterRecord> {
    (0..count)
        .map(|i| {
            PrinterRecord::new(format!("Printer {}", i + 1), i as i64 + 1, i == 0)
                .with_attribute("hostname", format!("octopi-{}.local", i + 1).into())
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let link = MemoryLink::new(seed_printers(cli.printers))
        .with_latency(Duration::from_millis(cli.latency_ms));
    let registry = SubscriberRegistry::new();
    let channel = SessionChannel::new(
        Arc::new(link.clone()),
        RecordStore::new(),
        registry.clone(),
    );
    let mut controller = SelectionController::new(
        Arc::new(channel.clone()),
        registry,
        LogDisplay,
        Arc::new(AlwaysVisible),
    );

    info!("-- activation (replica still empty)");
    controller.activate();

    info!("-- force refresh");
    controller.force_refresh();
    controller.process_next().await; // records changed
    controller.process_next().await; // refresh finished

    if controller.rendered().len() > 1 {
        info!("-- user selects row 1");
        controller.select_record(1);
    }

    info!("-- phone pushes an updated record set");
    channel.apply_remote_snapshot(link.fetch_printers().await?);
    controller.process_next().await;

    info!("-- deactivation");
    controller.deactivate();
    Ok(())
}
