//! Alohomora resource-scope resolution engine
//!
//! Core library behind the multi-cluster role-assignment console:
//! - In-memory inventory of cluster sets, clusters, projects, identities
//!   and roles, snapshotted per wizard session
//! - Common-scope resolution: which project names are selectable across a
//!   set of clusters
//! - A multi-step assignment wizard with gated forward navigation and
//!   lossless backward navigation
//! - Immutable role-assignment intents handed to a submission sink

pub mod assignment;
pub mod config;
pub mod inventory;
pub mod resolver;
pub mod validation;
pub mod wizard;

pub use assignment::{AssignmentSink, InMemorySink, LoggingSink};
pub use inventory::{InventoryManager, InventorySnapshot};
pub use wizard::{PrimaryStep, ScopeSubStep, WizardConfig, WizardSession};
