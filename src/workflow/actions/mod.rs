//! Side-effecting actions dispatched during traversal.
//!
//! Action configs are a tagged variant carrying strongly-typed per-type
//! config, so an unrecognized type is rejected while the graph is built
//! instead of mid-run. Delivery happens through the injectable
//! collaborators wired into the `ActionExecutor`.

pub mod email;
pub mod internal_notification;
pub mod push_notification;
pub mod sms;
pub mod webhook;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    FlowError, Result,
    common::Vars,
    delivery::{HttpClient, Mailer, PushSender, SmsSender},
    runtime::ExecutionContext,
    store::{NotificationStore, PushSubscriptionStore},
};

pub use email::EmailAction;
pub use internal_notification::InternalNotificationAction;
pub use push_notification::PushNotificationAction;
pub use sms::SmsAction;
pub use webhook::WebhookAction;

/// Typed action config, tagged by the wire `type` field.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "config", rename_all = "snake_case")]
pub enum ActionConfig {
    Email(EmailAction),
    Webhook(WebhookAction),
    InternalNotification(InternalNotificationAction),
    Sms(SmsAction),
    PushNotification(PushNotificationAction),
}

impl ActionConfig {
    /// Parse a raw `{type, config}` node config.
    pub fn parse(value: &Value) -> Result<Self> {
        let kind = value.get("type").and_then(Value::as_str).ok_or(FlowError::Node("action config missing 'type'".to_string()))?;

        let schema = match kind {
            "email" => EmailAction::schema(),
            "webhook" => WebhookAction::schema(),
            "internal_notification" => InternalNotificationAction::schema(),
            "sms" => SmsAction::schema(),
            "push_notification" => PushNotificationAction::schema(),
            other => return Err(FlowError::UnknownAction(other.to_string())),
        };

        let params = value.get("config").cloned().unwrap_or(json!({}));
        jsonschema::validate(&schema, &params)?;

        let action = serde_json::from_value::<Self>(json!({"type": kind, "config": params}))?;
        Ok(action)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ActionConfig::Email(_) => "email",
            ActionConfig::Webhook(_) => "webhook",
            ActionConfig::InternalNotification(_) => "internal_notification",
            ActionConfig::Sms(_) => "sms",
            ActionConfig::PushNotification(_) => "push_notification",
        }
    }
}

/// Dispatches actions to their delivery collaborators.
#[derive(Clone)]
pub struct ActionExecutor {
    mailer: Arc<dyn Mailer>,
    sms: Arc<dyn SmsSender>,
    http: Arc<dyn HttpClient>,
    push: Arc<dyn PushSender>,
    notifications: Arc<dyn NotificationStore>,
    subscriptions: Arc<dyn PushSubscriptionStore>,
}

impl ActionExecutor {
    pub fn new(
        mailer: Arc<dyn Mailer>,
        sms: Arc<dyn SmsSender>,
        http: Arc<dyn HttpClient>,
        push: Arc<dyn PushSender>,
        notifications: Arc<dyn NotificationStore>,
        subscriptions: Arc<dyn PushSubscriptionStore>,
    ) -> Self {
        Self {
            mailer,
            sms,
            http,
            push,
            notifications,
            subscriptions,
        }
    }

    /// Execute one action against the context, returning its result
    /// descriptor. Side effects are never retried or rolled back here.
    pub async fn execute(
        &self,
        action: &ActionConfig,
        ctx: &ExecutionContext,
    ) -> Result<Vars> {
        match action {
            ActionConfig::Email(a) => a.execute(self.mailer.as_ref(), ctx).await,
            ActionConfig::Webhook(a) => a.execute(self.http.as_ref(), ctx).await,
            ActionConfig::InternalNotification(a) => a.execute(self.notifications.as_ref(), ctx).await,
            ActionConfig::Sms(a) => a.execute(self.sms.as_ref(), ctx).await,
            ActionConfig::PushNotification(a) => a.execute(self.push.as_ref(), self.subscriptions.as_ref(), ctx).await,
        }
    }
}
