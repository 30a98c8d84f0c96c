//! Per-category backend-event handlers (spec.md §4.1).
//!
//! Split one file per event category, mirroring how the generic processor
//! dispatches `registrations` / `reg-updates` / `de-registrations` /
//! device-deletion entries to distinct handling rules.

pub mod deregistration;
pub mod device_deletion;
pub mod notification;
pub mod registration;
pub mod reregistration;
