//! Domain event entry points.
//!
//! Business commands call into the trigger handler after their own
//! persistence succeeds. The handler selects the tenant's ACTIVE flows
//! subscribed to the event kind, applies the trigger node's static
//! filters, and runs every match through the engine. A failing flow is
//! logged and never aborts the batch or reaches the event originator.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{debug, error};

use crate::{
    engine::WorkflowEngine,
    model::FlowModel,
    store::FlowStore,
    workflow::node::trigger_config,
};

/// Built-in event kinds; the set is open, any string can dispatch.
pub mod event_kinds {
    pub const MOVEMENT_CREATED: &str = "movement_created";
    pub const STOCK_CHANGE: &str = "stock_change";
    pub const STOCK_BELOW_MIN: &str = "stock_below_min";
    pub const STOCK_ABOVE_MAX: &str = "stock_above_max";
}

/// One domain event as raised by business commands.
#[derive(Debug, Clone)]
pub struct DomainEvent {
    pub kind: String,
    pub tenant_id: String,
    pub product: Option<Value>,
    pub movement: Option<Value>,
    pub store_id: Option<String>,
    pub user: Option<Value>,
}

impl DomainEvent {
    pub fn new(
        kind: &str,
        tenant_id: &str,
    ) -> Self {
        Self {
            kind: kind.to_string(),
            tenant_id: tenant_id.to_string(),
            product: None,
            movement: None,
            store_id: None,
            user: None,
        }
    }

    pub fn with_product(
        mut self,
        product: Value,
    ) -> Self {
        self.product = Some(product);
        self
    }

    pub fn with_movement(
        mut self,
        movement: Value,
    ) -> Self {
        self.movement = Some(movement);
        self
    }

    pub fn with_store_id(
        mut self,
        store_id: &str,
    ) -> Self {
        self.store_id = Some(store_id.to_string());
        self
    }

    pub fn with_user(
        mut self,
        user: Value,
    ) -> Self {
        self.user = Some(user);
        self
    }

    fn product_id(&self) -> Option<&str> {
        self.product.as_ref().and_then(|p| p.get("id")).and_then(Value::as_str)
    }

    fn movement_type(&self) -> Option<&str> {
        self.movement.as_ref().and_then(|m| m.get("type")).and_then(Value::as_str)
    }

    /// The trigger payload envelope handed to the engine.
    pub fn trigger_data(&self) -> Value {
        let mut data = json!({
            "trigger": {"type": self.kind},
            "variables": {}
        });

        if let Some(product) = &self.product {
            data["product"] = product.clone();
        }
        if let Some(movement) = &self.movement {
            data["movement"] = movement.clone();
        }
        if let Some(user) = &self.user {
            data["user"] = user.clone();
        }
        if let Some(store_id) = &self.store_id {
            data["store"] = json!({"id": store_id});
        }

        data
    }
}

/// Entry point invoked by domain events.
#[derive(Clone)]
pub struct TriggerHandler {
    flows: Arc<dyn FlowStore>,
    engine: WorkflowEngine,
}

impl TriggerHandler {
    pub fn new(
        flows: Arc<dyn FlowStore>,
        engine: WorkflowEngine,
    ) -> Self {
        Self {
            flows,
            engine,
        }
    }

    pub async fn handle_movement_created(
        &self,
        tenant_id: &str,
        product: Value,
        movement: Value,
        store_id: &str,
        user: Option<Value>,
    ) {
        let mut event = DomainEvent::new(event_kinds::MOVEMENT_CREATED, tenant_id).with_product(product).with_movement(movement).with_store_id(store_id);
        if let Some(user) = user {
            event = event.with_user(user);
        }
        self.handle(event).await;
    }

    pub async fn handle_stock_change(
        &self,
        tenant_id: &str,
        product: Value,
        store_id: &str,
    ) {
        self.handle(DomainEvent::new(event_kinds::STOCK_CHANGE, tenant_id).with_product(product).with_store_id(store_id)).await;
    }

    pub async fn handle_stock_below_min(
        &self,
        tenant_id: &str,
        product: Value,
        store_id: &str,
    ) {
        self.handle(DomainEvent::new(event_kinds::STOCK_BELOW_MIN, tenant_id).with_product(product).with_store_id(store_id)).await;
    }

    pub async fn handle_stock_above_max(
        &self,
        tenant_id: &str,
        product: Value,
        store_id: &str,
    ) {
        self.handle(DomainEvent::new(event_kinds::STOCK_ABOVE_MAX, tenant_id).with_product(product).with_store_id(store_id)).await;
    }

    /// Dispatch an event to every matching flow of its tenant.
    ///
    /// Errors are confined here: neither a failing flow nor a failing
    /// store lookup ever propagates to the event originator.
    pub async fn handle(
        &self,
        event: DomainEvent,
    ) {
        let flows = match self.flows.list_active_by_trigger(&event.tenant_id, &event.kind).await {
            Ok(flows) => flows,
            Err(err) => {
                error!(tenant = %event.tenant_id, kind = %event.kind, error = %err, "failed to load flows for trigger");
                return;
            }
        };

        debug!(tenant = %event.tenant_id, kind = %event.kind, candidates = flows.len(), "dispatching domain event");

        for flow in flows {
            if !should_execute_flow(&flow, &event) {
                debug!(flow_id = %flow.id, "flow excluded by trigger filters");
                continue;
            }

            if let Err(err) = self.engine.execute_workflow(&flow, event.trigger_data(), false).await {
                error!(flow_id = %flow.id, error = %err, "flow execution failed");
            }
        }
    }
}

/// Apply the trigger node's static filters to an event.
///
/// A present, non-empty list that does not contain the event's
/// corresponding value excludes the flow; absent or empty lists impose no
/// restriction.
pub(crate) fn should_execute_flow(
    flow: &FlowModel,
    event: &DomainEvent,
) -> bool {
    let Some(config) = trigger_config(flow) else {
        return false;
    };

    filter_allows(&config.filters.product_ids, event.product_id())
        && filter_allows(&config.filters.store_ids, event.store_id.as_deref())
        && filter_allows(&config.filters.movement_types, event.movement_type())
}

fn filter_allows(
    filter: &Option<Vec<String>>,
    value: Option<&str>,
) -> bool {
    match filter {
        Some(list) if !list.is_empty() => value.map(|v| list.iter().any(|entry| entry == v)).unwrap_or(false),
        _ => true,
    }
}
