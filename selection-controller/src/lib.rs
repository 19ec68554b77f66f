//! # Selection Controller
//!
//! The watch-side display-and-selection controller: keeps a locally rendered
//! ordered view of the replicated printer set, and the single default
//! selection within it, in sync with the phone.
//!
//! ## Modules
//! - `display`: Collaborator traits (display widget, visibility host).
//! - `controller`: The selection controller state machine.

pub mod controller;
pub mod display;

pub use controller::SelectionController;
pub use display::{PrinterDisplay, VisibilityHost};
