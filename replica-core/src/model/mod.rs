pub mod printer;

pub use printer::{PrinterRecord, ReplicaSnapshot};
