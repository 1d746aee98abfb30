//! # Lifecycle Notifications
//!
//! Observers learn about committed mutations through the
//! [`LifecycleNotifier`]. The service calls it explicitly after the store
//! accepts a write, handing over snapshots it captured itself:
//!
//! | Event | Payload | Snapshot source |
//! |---|---|---|
//! | resource added | new resource | the value just persisted |
//! | resource updated | previous, current | store read *before* the write |
//! | resource deleted | previous | store read *before* the write |
//! | resource type added | new type | the value just persisted |
//!
//! Delivery is sequential, in registration order, on the caller's task.
//! Nothing is retried or buffered. The first listener failure stops delivery
//! and is reported to the caller of the mutating operation.

pub mod listener;
pub mod notifier;

pub use listener::*;
pub use notifier::*;
