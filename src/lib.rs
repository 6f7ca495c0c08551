//! ilcheck - heuristic defect checks over .NET assembly metadata
//!
//! Loads a metadata dump of a compiled assembly and evaluates structural
//! rules (method size, property candidates, static candidates, finalizer
//! presence) over its types and methods.

pub mod cli;
pub mod config;
pub mod metadata;
pub mod metrics;
pub mod models;
pub mod reporters;
pub mod rules;
