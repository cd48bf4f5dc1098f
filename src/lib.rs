//! HTTP content negotiation, conditional request and byte-range delivery
//!
//! - `http`: header grammars (media types, entity tags, dates, ranges) and
//!   per-header semantics
//! - `delivery`: the decision engine that composes them into a status,
//!   headers and byte window, plus body writers
//! - `config` / `logger`: engine configuration and log output

pub mod config;
pub mod delivery;
pub mod http;
pub mod logger;

pub use config::EngineConfig;
pub use delivery::{DeliveryDecision, DeliveryEngine, DeliveryRequest, ResourceDescriptor};
