//! Guestbook Kubernetes Operator
//!
//! This operator mirrors each GuestbookEntry custom resource into a
//! ConfigMap it owns, and reports the outcome in the entry's status.

pub mod adapters;
pub mod config;
pub mod controllers;
pub mod crd;
pub mod error;
pub mod metrics;
pub mod reconcilers;

pub use error::{Error, Result};
