//! Sensor Monitor - polling dashboard client for temperature/humidity sensors
//!
//! This library exposes the core modules for testing and reuse.

pub mod api;
pub mod chart;
pub mod config;
pub mod controller;
pub mod error;
pub mod format;
pub mod view;
