//! Quoting Domain - Rule Selection and Premium Calculation
//!
//! This crate turns a stored catalog of pricing rules and a caller's request
//! into an itemized, tax-inclusive premium quote.
//!
//! # Pricing Model
//!
//! Each pricing rule carries a *bucket*: a reference sum insured and the base
//! premium charged for it. Quotes scale the bucket linearly to the requested
//! sum insured, add optional riders (add-ons), apply tax and convert the
//! annual total into installments with fixed modal factors.
//!
//! # Rule Selection
//!
//! Selection is first-match-wins in catalog order: the first rule whose
//! product, inclusive age band and effective date all fit is used, even if a
//! later rule is tighter.
//!
//! # Quick Quotes
//!
//! [`QuickQuoteCalculator`] prices instant estimates straight from
//! [`RatingTables`] without any rule catalog.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_quote::{QuoteRequest, QuoteService, RuleCatalog};
//!
//! let catalog = RuleCatalog::load(rules);
//! let request = QuoteRequest::new("health", dec!(35), dec!(1000000))
//!     .with_add_ons(["maternity"]);
//!
//! match service.full_quote(&catalog, &request)? {
//!     QuoteOutcome::Quoted(quote) => println!("{}", quote.total_payable),
//!     QuoteOutcome::NoMatchingRule => println!("no rule"),
//! }
//! ```

pub mod rule;
pub mod selector;
pub mod premium;
pub mod tables;
pub mod request;
pub mod quote;
pub mod calculator;
pub mod quick_quote;
pub mod catalog;
pub mod source;
pub mod services;
pub mod error;

pub use rule::{PricingRule, RuleNumber, AddOnDefinition, AddOnKind, RuleBucket, Effectivity, parse_add_ons, normalize_product};
pub use selector::{select_rule, SkipReason};
pub use premium::{PaymentFrequency, ModalFactors, PaymentSchedule, Settlement, settle};
pub use tables::{RatingTables, AgeLoadingBand};
pub use request::QuoteRequest;
pub use quote::{Quote, QuoteOutcome, QuoteStamp, AddOnCharge, NO_MATCHING_RULE};
pub use calculator::PremiumCalculator;
pub use quick_quote::{QuickQuote, QuickQuoteCalculator, QuickQuoteRequest};
pub use catalog::{RuleCatalog, RuleIssue, IssueSeverity};
pub use source::{PricingRuleSource, InMemoryRuleSource};
pub use services::QuoteService;
pub use error::QuoteError;
