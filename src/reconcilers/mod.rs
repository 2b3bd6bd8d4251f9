//! Reconcilers converging cluster state onto custom resources

pub mod guestbook;
