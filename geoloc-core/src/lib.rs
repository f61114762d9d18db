//! Core library for the `geoloc` CLI.
//!
//! This crate defines:
//! - The [`Location`] entity with distance, naming and overlap checks
//! - Place name lookup against the OpenWeather geocoding API
//! - Removal of near-duplicate geocoding results
//! - Settings persistence (API keys, default location)
//!
//! It is used by `geoloc-cli`, but can also be reused by other binaries or services.

pub mod dedup;
pub mod geo;
pub mod location;
pub mod resolver;
pub mod settings;
pub mod transport;

pub use dedup::remove_overlapping;
pub use location::{Location, OVERLAP_DISTANCE_KM};
pub use resolver::{DEFAULT_MAX_RESULTS, LocationError, LocationResolver};
pub use settings::{Settings, SettingsStore};
pub use transport::{Transport, TransportError};
