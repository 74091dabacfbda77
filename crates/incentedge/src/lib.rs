//! Incentive matching and portfolio valuation engine.
//!
//! The [`engine`] module is the pure computational core (match, estimate,
//! aggregate); [`catalog`] loads immutable program snapshots; [`portfolio`]
//! adds the persistence seam and HTTP router used by the dashboard API.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod portfolio;
pub mod telemetry;
