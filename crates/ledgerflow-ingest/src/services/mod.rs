//! Pipeline services.

pub mod aggregator;
pub mod export_parser;
pub mod export_service;
pub mod fingerprint;
pub mod ledger_committer;
