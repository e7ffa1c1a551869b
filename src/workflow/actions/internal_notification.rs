use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    FlowError, Result,
    common::Vars,
    runtime::ExecutionContext,
    store::{
        NotificationStore,
        data::{NotificationKind, NotificationPriority},
    },
    workflow::template,
};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct InternalNotificationAction {
    pub user_ids: Option<Vec<String>>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    pub priority: Option<NotificationPriority>,
}

impl InternalNotificationAction {
    pub(crate) fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "user_ids": { "type": "array", "items": { "type": "string" } },
                "title": { "type": "string" },
                "message": { "type": "string" },
                "priority": { "type": "string", "enum": ["LOW", "MEDIUM", "HIGH"] }
            }
        })
    }

    pub async fn execute(
        &self,
        notifications: &dyn NotificationStore,
        ctx: &ExecutionContext,
    ) -> Result<Vars> {
        let user_ids = self.user_ids.as_deref().filter(|ids| !ids.is_empty()).ok_or(FlowError::Validation("internal notification action requires 'user_ids'".to_string()))?;

        let title = template::replace_variables(ctx, &self.title);
        let message = template::replace_variables(ctx, &self.message);
        let priority = self.priority.unwrap_or_default();

        // One independent record per recipient, payload snapshots the run
        // context.
        for user_id in user_ids {
            notifications.create(user_id, &title, &message, NotificationKind::System, priority, ctx.snapshot()).await?;
        }

        Ok(Vars::new().with("notifications_created", user_ids.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemNotificationStore;

    fn context() -> ExecutionContext {
        ExecutionContext::build(&serde_json::json!({
            "trigger": {"type": "stock_below_min"},
            "product": {"name": "Widget", "stock": 1}
        }))
    }

    #[tokio::test]
    async fn test_creates_one_record_per_user() {
        let store = MemNotificationStore::new();
        let action = InternalNotificationAction {
            user_ids: Some(vec!["u1".to_string(), "u2".to_string()]),
            title: "Low stock".to_string(),
            message: "{{product.name}} is at {{product.stock}}".to_string(),
            priority: None,
        };

        let result = action.execute(&store, &context()).await.unwrap();
        assert_eq!(result.get::<usize>("notifications_created"), Some(2));

        let records = store.all();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].user_id, "u1");
        assert_eq!(records[1].user_id, "u2");
        assert_eq!(records[0].message, "Widget is at 1");
        assert_eq!(records[0].kind, NotificationKind::System);
        assert_eq!(records[0].priority, NotificationPriority::Medium);
    }

    #[tokio::test]
    async fn test_explicit_priority_kept() {
        let store = MemNotificationStore::new();
        let action = InternalNotificationAction {
            user_ids: Some(vec!["u1".to_string()]),
            priority: Some(NotificationPriority::High),
            ..Default::default()
        };

        action.execute(&store, &context()).await.unwrap();
        assert_eq!(store.all()[0].priority, NotificationPriority::High);
    }

    #[tokio::test]
    async fn test_empty_user_ids_is_validation_error() {
        let store = MemNotificationStore::new();

        for user_ids in [None, Some(vec![])] {
            let action = InternalNotificationAction {
                user_ids,
                ..Default::default()
            };
            let err = action.execute(&store, &context()).await.unwrap_err();
            assert!(matches!(err, FlowError::Validation(_)));
        }
        assert!(store.all().is_empty());
    }
}
