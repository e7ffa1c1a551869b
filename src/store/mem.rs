//! In-memory storage collaborators for tests and lightweight embedding.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use async_trait::async_trait;
use serde_json::Value;

use crate::{
    FlowError, Result,
    model::{FlowModel, FlowStatus},
    store::{
        ExecutionLogStore, FlowStore, NotificationStore, PushSubscriptionStore,
        data::{ExecutionRecord, ExecutionStatus, NotificationKind, NotificationPriority, NotificationRecord, PushSubscription, StepLog},
    },
    utils,
    workflow::node::trigger_config,
};

/// In-memory flow definition store.
#[derive(Clone, Default)]
pub struct MemFlowStore {
    flows: Arc<RwLock<Vec<FlowModel>>>,
}

impl MemFlowStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        flow: FlowModel,
    ) {
        let mut flows = self.flows.write().unwrap();
        flows.retain(|f| f.id != flow.id);
        flows.push(flow);
    }
}

#[async_trait]
impl FlowStore for MemFlowStore {
    async fn get(
        &self,
        flow_id: &str,
    ) -> Result<FlowModel> {
        let flows = self.flows.read().unwrap();
        flows.iter().find(|f| f.id == flow_id).cloned().ok_or(FlowError::Store(format!("flow {} not found", flow_id)))
    }

    async fn list_active_by_trigger(
        &self,
        tenant_id: &str,
        event_type: &str,
    ) -> Result<Vec<FlowModel>> {
        let flows = self.flows.read().unwrap();
        Ok(flows
            .iter()
            .filter(|f| f.tenant_id == tenant_id && f.status == FlowStatus::Active)
            .filter(|f| trigger_config(f).map(|c| c.event_type == event_type).unwrap_or(false))
            .cloned()
            .collect())
    }
}

/// In-memory execution record store.
#[derive(Clone, Default)]
pub struct MemExecutionStore {
    records: Arc<RwLock<HashMap<String, ExecutionRecord>>>,
}

impl MemExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(
        &self,
        execution_id: &str,
    ) -> Option<ExecutionRecord> {
        self.records.read().unwrap().get(execution_id).cloned()
    }

    pub fn all(&self) -> Vec<ExecutionRecord> {
        self.records.read().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl ExecutionLogStore for MemExecutionStore {
    async fn create(
        &self,
        record: ExecutionRecord,
    ) -> Result<()> {
        let mut records = self.records.write().unwrap();
        if records.contains_key(&record.id) {
            return Err(FlowError::Store(format!("execution {} already exists", record.id)));
        }
        records.insert(record.id.clone(), record);
        Ok(())
    }

    async fn update(
        &self,
        execution_id: &str,
        status: ExecutionStatus,
        error: Option<String>,
    ) -> Result<()> {
        let mut records = self.records.write().unwrap();
        let record = records.get_mut(execution_id).ok_or(FlowError::Store(format!("execution {} not found", execution_id)))?;
        record.status = status;
        record.error = error;
        Ok(())
    }

    async fn finalize(
        &self,
        execution_id: &str,
        success: bool,
        error: Option<String>,
        log: Vec<StepLog>,
    ) -> Result<()> {
        let mut records = self.records.write().unwrap();
        let record = records.get_mut(execution_id).ok_or(FlowError::Store(format!("execution {} not found", execution_id)))?;
        record.status = if success { ExecutionStatus::Success } else { ExecutionStatus::Failed };
        record.error = error;
        record.log = log;
        record.finished_at = Some(utils::time::time_millis());
        Ok(())
    }
}

/// In-memory notification store.
#[derive(Clone, Default)]
pub struct MemNotificationStore {
    notifications: Arc<RwLock<Vec<NotificationRecord>>>,
}

impl MemNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<NotificationRecord> {
        self.notifications.read().unwrap().clone()
    }
}

#[async_trait]
impl NotificationStore for MemNotificationStore {
    async fn create(
        &self,
        user_id: &str,
        title: &str,
        message: &str,
        kind: NotificationKind,
        priority: NotificationPriority,
        data: Value,
    ) -> Result<()> {
        self.notifications.write().unwrap().push(NotificationRecord {
            user_id: user_id.to_string(),
            title: title.to_string(),
            message: message.to_string(),
            kind,
            priority,
            data,
            created_at: utils::time::time_millis(),
        });
        Ok(())
    }
}

/// In-memory push subscription store.
#[derive(Clone, Default)]
pub struct MemPushSubscriptionStore {
    subscriptions: Arc<RwLock<HashMap<String, PushSubscription>>>,
}

impl MemPushSubscriptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        subscription: PushSubscription,
    ) {
        self.subscriptions.write().unwrap().insert(subscription.id.clone(), subscription);
    }

    pub fn contains(
        &self,
        subscription_id: &str,
    ) -> bool {
        self.subscriptions.read().unwrap().contains_key(subscription_id)
    }
}

#[async_trait]
impl PushSubscriptionStore for MemPushSubscriptionStore {
    async fn find_by_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<PushSubscription>> {
        let subscriptions = self.subscriptions.read().unwrap();
        let mut found: Vec<PushSubscription> = subscriptions.values().filter(|s| s.user_id == user_id).cloned().collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    async fn delete(
        &self,
        subscription_id: &str,
    ) -> Result<()> {
        self.subscriptions.write().unwrap().remove(subscription_id);
        Ok(())
    }
}
