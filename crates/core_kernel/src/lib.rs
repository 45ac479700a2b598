//! Core Kernel - Foundational types and utilities for the quoting system
//!
//! This crate provides the building blocks shared by the domain and API crates:
//! - Decimal money helpers with the quote rounding policy
//! - Injectable clocks and lenient date parsing
//! - Typed identifiers
//! - Port and adapter infrastructure

pub mod money;
pub mod temporal;
pub mod identifiers;
pub mod ports;

pub use money::{Currency, MoneyError, Rate, round2, round_half_away, checked_ratio, checked_product, checked_sum};
pub use temporal::{Clock, SystemClock, FixedClock, SharedClock, TemporalError, parse_instant};
pub use identifiers::{QuoteId, RuleSetId};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
