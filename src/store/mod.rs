//! Storage collaborators the engine reads from and writes to.
//!
//! The engine never owns business persistence; it talks to these traits:
//! - `FlowStore`: read-only access to flow definitions
//! - `ExecutionLogStore`: lifecycle of per-run execution records
//! - `NotificationStore`: internal notification creation
//! - `PushSubscriptionStore`: registered push subscriptions per user
//!
//! `store::mem` provides in-memory implementations for tests and embedding.

pub mod data;
mod mem;

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    Result,
    model::FlowModel,
    store::data::{ExecutionRecord, NotificationKind, NotificationPriority, PushSubscription},
};

pub use mem::{MemExecutionStore, MemFlowStore, MemNotificationStore, MemPushSubscriptionStore};

/// Read-only access to stored flow definitions.
#[async_trait]
pub trait FlowStore: Send + Sync {
    /// Finds a flow by id.
    async fn get(
        &self,
        flow_id: &str,
    ) -> Result<FlowModel>;

    /// Lists ACTIVE flows of a tenant whose trigger node subscribes to the
    /// given event kind.
    async fn list_active_by_trigger(
        &self,
        tenant_id: &str,
        event_type: &str,
    ) -> Result<Vec<FlowModel>>;
}

/// Append-only persistence of execution records.
///
/// Not called at all when a run is invoked in test mode.
#[async_trait]
pub trait ExecutionLogStore: Send + Sync {
    /// Creates a RUNNING record at the start of a run.
    async fn create(
        &self,
        record: ExecutionRecord,
    ) -> Result<()>;

    /// Patches status and error of a running record.
    async fn update(
        &self,
        execution_id: &str,
        status: data::ExecutionStatus,
        error: Option<String>,
    ) -> Result<()>;

    /// Finalizes a record exactly once at the end of a run, persisting the
    /// step log accumulated during traversal.
    async fn finalize(
        &self,
        execution_id: &str,
        success: bool,
        error: Option<String>,
        log: Vec<data::StepLog>,
    ) -> Result<()>;
}

/// Creates internal notification records.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(
        &self,
        user_id: &str,
        title: &str,
        message: &str,
        kind: NotificationKind,
        priority: NotificationPriority,
        data: Value,
    ) -> Result<()>;
}

/// Registered push subscriptions per user.
#[async_trait]
pub trait PushSubscriptionStore: Send + Sync {
    async fn find_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<PushSubscription>>;

    /// Removes a subscription record, used to prune expired endpoints.
    async fn delete(
        &self,
        subscription_id: &str,
    ) -> Result<()>;
}
