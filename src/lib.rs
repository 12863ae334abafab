#![doc(test(attr(deny(warnings))))]

//! Allowance Core derives a per-day spending limit from a ledger of dated
//! income and expense events, carrying unspent balance forward and spreading
//! overspend across future days.

pub mod engine;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod tracker;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Allowance Core tracing initialized.");
    });
}
