pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::EngineConfig;

pub use adapters::memory::{InMemoryInbox, InMemoryStore};
pub use core::{
    acceptance::AcceptanceArbiter, interaction::InteractionService, ledger::VoteLedger,
    notification::NotificationDispatcher, reputation::ReputationPolicy,
};
pub use utils::error::{InteractionError, Result};
