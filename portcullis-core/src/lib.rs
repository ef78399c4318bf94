//! Core functionality for the portcullis login guard
//!
//! This crate contains the domain types, repository traits, and services that
//! make up the brute-force guard: the attempt ledger contract, the failure
//! counter contract, the partitioned last-login cache, and the decision logic
//! that ties them together on every authentication attempt.
//!
//! It is storage-agnostic. Concrete backends implement the repository traits
//! ([`repositories::AttemptLedger`], [`repositories::UserRepository`],
//! [`repositories::FailureCounter`]) and expose a [`repositories::RepositoryProvider`]
//! that the facade crate wires into services.

pub mod attempt;
pub mod cache;
pub mod config;
pub mod crypto;
pub mod error;
pub mod repositories;
pub mod services;
pub mod user;

pub use attempt::{LastLogin, LoginAttempt, NewLoginAttempt, client_addr};
pub use cache::{ShardKey, ShardedCache};
pub use config::GuardConfig;
pub use error::Error;
pub use user::{NewUser, User, UserId};
