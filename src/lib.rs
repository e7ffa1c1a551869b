//! # Stockflow
//!
//! Stockflow is a lightweight workflow automation engine for inventory
//! domain events, written in Rust. It is designed to be embedded in a
//! multi-tenant business backend to run user-defined automation flows.
//!
//! ## Core Features
//!
//! - **Event-Driven Triggers**: domain events select and filter the flows
//!   subscribed to them per tenant
//! - **Graph Execution**: depth-first traversal of trigger, condition and
//!   action nodes with cycle protection
//! - **Templated Actions**: email, webhook, internal notification, SMS and
//!   push delivery with `{{dotted.path}}` substitution
//! - **Pluggable Collaborators**: storage and delivery behind traits, with
//!   in-memory reference implementations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stockflow::{DomainEvent, EngineBuilder, TriggerHandler, event_kinds};
//!
//! let engine = EngineBuilder::new().build();
//! let handler = TriggerHandler::new(flow_store, engine);
//!
//! // Raised by business commands after their own persistence succeeds.
//! handler
//!     .handle(DomainEvent::new(event_kinds::MOVEMENT_CREATED, "tenant-1")
//!         .with_product(product_json)
//!         .with_store_id("store-1"))
//!     .await;
//! ```

mod builder;
mod common;
mod config;
mod engine;
mod error;
pub mod delivery;
pub mod model;
mod runtime;
pub mod store;
mod trigger;
mod utils;
pub mod workflow;

pub use builder::EngineBuilder;
pub use common::Vars;
pub use config::Config;
pub use engine::WorkflowEngine;
pub use error::FlowError;
pub use runtime::{ExecutionContext, ExecutionReport, ExecutionState, LoopController, LoopDecision};
pub use trigger::{DomainEvent, TriggerHandler, event_kinds};

/// Result type alias for Stockflow operations.
pub type Result<T> = std::result::Result<T, FlowError>;
