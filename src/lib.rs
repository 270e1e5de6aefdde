#![doc(test(attr(deny(warnings))))]

//! Contas Core keeps a personal bill tracker's state durable: bills and
//! category records live in an explicit [`domain::DomainModel`], every
//! mutation is committed through a dual-write [`persistence::PersistenceEngine`],
//! and category lifecycle rules are enforced by
//! [`core::services::CategoryService`].

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod persistence;
pub mod storage;
pub mod transfer;
pub mod utils;

pub use crate::core::tracker::{FlushTrigger, Tracker};
pub use errors::{Result, TrackerError};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Contas Core tracing initialized.");
    });
}
