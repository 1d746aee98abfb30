#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Resource Registry
//!
//! > **Typed, schema-validated, field-indexed resources behind one service.**
//!
//! A resource is a JSON or XML payload governed by a named resource type. The
//! registry validates each payload against its type's schema, extracts
//! searchable fields from it, persists it, and tells observers what changed.
//!
//! ## 🏗️ Design
//!
//! ### One pipeline, one task
//! Every mutation runs a fixed sequence of steps on the caller's task:
//! validate, index, persist, notify. A failing step ends the operation and
//! nothing after it runs. Observers only hear about writes the store accepted.
//!
//! ### Capabilities at the seams
//! Validation ([`PayloadValidator`](validation::PayloadValidator)), extraction
//! ([`ExtractorFactory`](index::ExtractorFactory)), storage
//! ([`ResourceStore`](store::ResourceStore)) and observation
//! ([`ResourceListener`](lifecycle::ResourceListener)) are traits. The defaults
//! cover JSON and XML and an in-memory store; anything else plugs in through
//! [`RegistrySystem::builder`](runtime::RegistrySystem::builder).
//!
//! ### The store is an actor
//! The in-memory store owns its maps inside a Tokio task and answers requests
//! over a channel, so each store call is atomic without locks.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Data ([`model`])
//! [`Resource`](model::Resource), [`ResourceType`](model::ResourceType) and the
//! [`IndexedField`](model::IndexedField)s extracted from payloads.
//!
//! ### 2. The Orchestrator ([`service`])
//! [`ResourceService`](service::ResourceService) sequences every operation and
//! maps collaborator failures onto [`RegistryError`](error::RegistryError).
//!
//! ### 3. The Capabilities ([`validation`], [`index`], [`store`], [`lifecycle`])
//! Schema checks, field extraction, persistence and lifecycle notification.
//! [`MockStore`](store::mock::MockStore) scripts store failures in tests.
//!
//! ### 4. The Wiring ([`runtime`])
//! [`RegistryConfig`](runtime::RegistryConfig),
//! [`RegistrySystem`](runtime::RegistrySystem) and tracing setup.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the demo with info logs
//! RUST_LOG=info cargo run
//!
//! # Run the tests
//! cargo test
//! ```

pub mod error;
pub mod index;
pub mod lifecycle;
pub mod model;
pub mod runtime;
pub mod service;
pub mod store;
pub mod validation;

mod xml_tree;
