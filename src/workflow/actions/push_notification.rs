use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::warn;

use crate::{
    FlowError, Result,
    common::Vars,
    delivery::PushSender,
    runtime::ExecutionContext,
    store::PushSubscriptionStore,
    workflow::template,
};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PushNotificationAction {
    pub user_ids: Option<Vec<String>>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub icon: Option<String>,
    pub badge: Option<String>,
    pub data: Option<Value>,
    pub actions: Option<Value>,
}

impl PushNotificationAction {
    pub(crate) fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "user_ids": { "type": "array", "items": { "type": "string" } },
                "title": { "type": "string" },
                "body": { "type": "string" },
                "icon": { "type": "string" },
                "badge": { "type": "string" },
                "data": {},
                "actions": { "type": "array" }
            }
        })
    }

    pub async fn execute(
        &self,
        push: &dyn PushSender,
        subscriptions: &dyn PushSubscriptionStore,
        ctx: &ExecutionContext,
    ) -> Result<Vars> {
        let user_ids = self.user_ids.as_deref().filter(|ids| !ids.is_empty()).ok_or(FlowError::Validation("push notification action requires 'user_ids'".to_string()))?;

        let mut targets = Vec::new();
        for user_id in user_ids {
            targets.extend(subscriptions.find_by_user(user_id).await?);
        }

        // Recipients without registered subscriptions are not an error.
        if targets.is_empty() {
            return Ok(Vars::new().with("subscriptions_sent", 0).with("subscriptions_failed", 0));
        }

        let payload = json!({
            "title": template::replace_variables(ctx, &self.title),
            "body": template::replace_variables(ctx, &self.body),
            "icon": self.icon,
            "badge": self.badge,
            "data": self.data,
            "actions": self.actions,
        });

        // Fan out to every subscription at once; the barrier settles all
        // sends so one failure cannot block or fail the others.
        let results = join_all(targets.iter().map(|subscription| push.send(subscription, &payload))).await;

        let mut sent: u32 = 0;
        let mut failed: u32 = 0;
        for (subscription, result) in targets.iter().zip(results) {
            match result {
                Ok(()) => sent += 1,
                Err(err) => {
                    failed += 1;
                    warn!(subscription = %subscription.id, error = %err, "push delivery failed");
                    if is_expired_endpoint(&err.to_string()) {
                        let _ = subscriptions.delete(&subscription.id).await;
                    }
                }
            }
        }

        Ok(Vars::new().with("subscriptions_sent", sent).with("subscriptions_failed", failed))
    }
}

/// Delivery errors whose text marks the endpoint as gone for good.
fn is_expired_endpoint(message: &str) -> bool {
    let message = message.to_lowercase();
    ["expired", "invalid", "gone", "404", "410"].iter().any(|marker| message.contains(marker))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::store::{MemPushSubscriptionStore, data::PushSubscription};

    struct FakePushSender {
        failing_endpoints: Vec<(String, String)>,
        delivered: Arc<Mutex<Vec<(String, Value)>>>,
    }

    impl FakePushSender {
        fn new(failing_endpoints: Vec<(&str, &str)>) -> Self {
            Self {
                failing_endpoints: failing_endpoints.into_iter().map(|(e, m)| (e.to_string(), m.to_string())).collect(),
                delivered: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    #[async_trait]
    impl PushSender for FakePushSender {
        async fn send(
            &self,
            subscription: &PushSubscription,
            payload: &Value,
        ) -> Result<()> {
            if let Some((_, message)) = self.failing_endpoints.iter().find(|(endpoint, _)| *endpoint == subscription.endpoint) {
                return Err(FlowError::Delivery(message.clone()));
            }
            self.delivered.lock().unwrap().push((subscription.endpoint.clone(), payload.clone()));
            Ok(())
        }
    }

    fn subscription(
        id: &str,
        user_id: &str,
        endpoint: &str,
    ) -> PushSubscription {
        PushSubscription {
            id: id.to_string(),
            user_id: user_id.to_string(),
            endpoint: endpoint.to_string(),
            keys: Value::Null,
        }
    }

    fn context() -> ExecutionContext {
        ExecutionContext::build(&serde_json::json!({
            "trigger": {"type": "stock_below_min"},
            "product": {"name": "Widget"}
        }))
    }

    fn action(user_ids: Vec<&str>) -> PushNotificationAction {
        PushNotificationAction {
            user_ids: Some(user_ids.into_iter().map(String::from).collect()),
            title: "Low stock".to_string(),
            body: "{{product.name}} needs a restock".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_zero_subscriptions_is_success() {
        let store = MemPushSubscriptionStore::new();
        let sender = FakePushSender::new(vec![]);

        let result = action(vec!["u1"]).execute(&sender, &store, &context()).await.unwrap();
        assert_eq!(result.get::<u32>("subscriptions_sent"), Some(0));
        assert_eq!(result.get::<u32>("subscriptions_failed"), Some(0));
    }

    #[tokio::test]
    async fn test_delivers_resolved_payload_to_all_subscriptions() {
        let store = MemPushSubscriptionStore::new();
        store.insert(subscription("s1", "u1", "https://push/1"));
        store.insert(subscription("s2", "u1", "https://push/2"));
        store.insert(subscription("s3", "u2", "https://push/3"));
        let sender = FakePushSender::new(vec![]);

        let result = action(vec!["u1", "u2"]).execute(&sender, &store, &context()).await.unwrap();
        assert_eq!(result.get::<u32>("subscriptions_sent"), Some(3));

        let delivered = sender.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 3);
        assert_eq!(delivered[0].1["body"], json!("Widget needs a restock"));
    }

    #[tokio::test]
    async fn test_one_failure_does_not_block_others() {
        let store = MemPushSubscriptionStore::new();
        store.insert(subscription("s1", "u1", "https://push/1"));
        store.insert(subscription("s2", "u1", "https://push/2"));
        let sender = FakePushSender::new(vec![("https://push/1", "connection reset")]);

        let result = action(vec!["u1"]).execute(&sender, &store, &context()).await.unwrap();
        assert_eq!(result.get::<u32>("subscriptions_sent"), Some(1));
        assert_eq!(result.get::<u32>("subscriptions_failed"), Some(1));
        // transient failure keeps the subscription
        assert!(store.contains("s1"));
    }

    #[tokio::test]
    async fn test_expired_endpoint_is_pruned() {
        let store = MemPushSubscriptionStore::new();
        store.insert(subscription("s1", "u1", "https://push/1"));
        store.insert(subscription("s2", "u1", "https://push/2"));
        let sender = FakePushSender::new(vec![("https://push/1", "push endpoint expired: status 410")]);

        let result = action(vec!["u1"]).execute(&sender, &store, &context()).await.unwrap();
        assert_eq!(result.get::<u32>("subscriptions_failed"), Some(1));
        assert!(!store.contains("s1"));
        assert!(store.contains("s2"));
    }

    #[tokio::test]
    async fn test_missing_user_ids_is_validation_error() {
        let store = MemPushSubscriptionStore::new();
        let sender = FakePushSender::new(vec![]);

        let err = PushNotificationAction::default().execute(&sender, &store, &context()).await.unwrap_err();
        assert!(matches!(err, FlowError::Validation(_)));
    }
}
