use crate::model::PrinterRecord;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

/// Failures crossing the phone link.
#[derive(Error, Debug)]
pub enum LinkError {
    /// The phone could not be reached or the round trip failed mid-flight.
    #[error("phone unreachable: {0}")]
    Unreachable(String),

    /// The watch session is not paired/active.
    #[error("watch session inactive")]
    SessionInactive,
}

/// Abstraction over the byte transport to the phone.
///
/// Implementation details (watch connectivity session, memory fake) are
/// hidden behind this trait; the channel only sees typed round trips.
#[async_trait]
pub trait PhoneLink: Send + Sync {
    /// Fetch the authoritative printer set from the phone.
    async fn fetch_printers(&self) -> Result<Vec<PrinterRecord>, LinkError>;

    /// Ask the phone to make `printer_name` the default.
    async fn push_default(&self, printer_name: &str) -> Result<(), LinkError>;
}

/// In-memory phone link for demos and tests.
///
/// Plays the phone's role: holds the authoritative printer list, optionally
/// sleeps to simulate the round trip, and can be switched into a failing
/// mode.
#[derive(Clone, Default)]
pub struct MemoryLink {
    printers: Arc<Mutex<Vec<PrinterRecord>>>,
    latency: Option<Duration>,
    failing: Arc<Mutex<bool>>,
}

impl MemoryLink {
    pub fn new(printers: Vec<PrinterRecord>) -> Self {
        Self {
            printers: Arc::new(Mutex::new(printers)),
            latency: None,
            failing: Arc::new(Mutex::new(false)),
        }
    }

    /// Simulate a slow round trip.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Replace the phone-side printer list (the "remote edit").
    pub fn set_printers(&self, printers: Vec<PrinterRecord>) {
        *self.printers.lock().expect("memory link lock poisoned") = printers;
    }

    /// Switch the link into (or out of) a failing mode.
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().expect("memory link lock poisoned") = failing;
    }

    fn check_reachable(&self) -> Result<(), LinkError> {
        if *self.failing.lock().expect("memory link lock poisoned") {
            return Err(LinkError::Unreachable("memory link set to fail".into()));
        }
        Ok(())
    }

    async fn simulate_round_trip(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl PhoneLink for MemoryLink {
    async fn fetch_printers(&self) -> Result<Vec<PrinterRecord>, LinkError> {
        self.simulate_round_trip().await;
        self.check_reachable()?;
        Ok(self
            .printers
            .lock()
            .expect("memory link lock poisoned")
            .clone())
    }

    async fn push_default(&self, printer_name: &str) -> Result<(), LinkError> {
        self.simulate_round_trip().await;
        self.check_reachable()?;
        let mut printers = self.printers.lock().expect("memory link lock poisoned");
        if !printers.iter().any(|p| p.name() == printer_name) {
            return Err(LinkError::Unreachable(format!(
                "unknown printer: {printer_name}"
            )));
        }
        for printer in printers.iter_mut() {
            printer.set_default(printer.name() == printer_name);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn push_default_moves_the_flag() {
        let link = MemoryLink::new(vec![
            PrinterRecord::new("Ender", 1, true),
            PrinterRecord::new("Prusa", 2, false),
        ]);

        link.push_default("Prusa").await.unwrap();

        let printers = link.fetch_printers().await.unwrap();
        let defaults: Vec<&str> = printers
            .iter()
            .filter(|p| p.is_default())
            .map(|p| p.name())
            .collect();
        assert_eq!(defaults, vec!["Prusa"]);
    }

    #[tokio::test]
    async fn failing_link_surfaces_unreachable() {
        let link = MemoryLink::new(vec![PrinterRecord::new("Ender", 1, true)]);
        link.set_failing(true);
        assert!(matches!(
            link.fetch_printers().await,
            Err(LinkError::Unreachable(_))
        ));
    }
}
