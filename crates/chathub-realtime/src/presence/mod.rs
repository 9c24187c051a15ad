//! Presence registry: which users hold a live connection.

pub mod registry;

pub use registry::{PresenceRegistry, Removal};
