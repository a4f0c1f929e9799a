//! Miniship: mini-program publish and preview automation.
//!
//! This crate fetches mini-program sources, builds them and drives the
//! `WeChat`, Alipay and Toutiao vendor tooling to upload releases or render
//! preview QR codes, journaling every stage and pushing live status to
//! subscribers.
//!
//! # Architecture
//!
//! Miniship follows hexagonal architecture principles:
//!
//! - **Domain**: Pure run state with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for stores, notifications,
//!   commands, source transfer and platform tooling
//! - **Adapters**: In-memory and process-backed implementations of ports
//!
//! # Modules
//!
//! - [`release`]: Run lifecycle, journal and orchestration
//! - [`config`]: TOML run configuration
//! - [`telemetry`]: Tracing subscriber setup

pub mod config;
pub mod release;
pub mod telemetry;
