//! Request and response data transfer objects

pub mod quote;
pub mod rules;
