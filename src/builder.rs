use std::sync::Arc;

use crate::{
    Config,
    delivery::{HttpClient, HttpPushSender, Mailer, NoopMailer, NoopSmsSender, PushSender, ReqwestHttpClient, SmsSender},
    engine::WorkflowEngine,
    store::{ExecutionLogStore, MemExecutionStore, MemNotificationStore, MemPushSubscriptionStore, NotificationStore, PushSubscriptionStore},
    workflow::actions::ActionExecutor,
};

/// Wires a [`WorkflowEngine`] from config, storage and delivery
/// collaborators. Everything not supplied falls back to the in-memory /
/// no-op reference implementations.
pub struct EngineBuilder {
    config: Config,
    executions: Option<Arc<dyn ExecutionLogStore>>,
    notifications: Option<Arc<dyn NotificationStore>>,
    subscriptions: Option<Arc<dyn PushSubscriptionStore>>,
    mailer: Option<Arc<dyn Mailer>>,
    sms: Option<Arc<dyn SmsSender>>,
    http: Option<Arc<dyn HttpClient>>,
    push: Option<Arc<dyn PushSender>>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            config: Config::default(),
            executions: None,
            notifications: None,
            subscriptions: None,
            mailer: None,
            sms: None,
            http: None,
            push: None,
        }
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(
        mut self,
        config: Config,
    ) -> Self {
        self.config = config;
        self
    }

    pub fn executions(
        mut self,
        executions: Arc<dyn ExecutionLogStore>,
    ) -> Self {
        self.executions = Some(executions);
        self
    }

    pub fn notification_store(
        mut self,
        notifications: Arc<dyn NotificationStore>,
    ) -> Self {
        self.notifications = Some(notifications);
        self
    }

    pub fn push_subscription_store(
        mut self,
        subscriptions: Arc<dyn PushSubscriptionStore>,
    ) -> Self {
        self.subscriptions = Some(subscriptions);
        self
    }

    pub fn mailer(
        mut self,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn sms_sender(
        mut self,
        sms: Arc<dyn SmsSender>,
    ) -> Self {
        self.sms = Some(sms);
        self
    }

    pub fn http_client(
        mut self,
        http: Arc<dyn HttpClient>,
    ) -> Self {
        self.http = Some(http);
        self
    }

    pub fn push_sender(
        mut self,
        push: Arc<dyn PushSender>,
    ) -> Self {
        self.push = Some(push);
        self
    }

    pub fn build(self) -> WorkflowEngine {
        let executions = self.executions.unwrap_or_else(|| Arc::new(MemExecutionStore::new()));
        let notifications = self.notifications.unwrap_or_else(|| Arc::new(MemNotificationStore::new()));
        let subscriptions = self.subscriptions.unwrap_or_else(|| Arc::new(MemPushSubscriptionStore::new()));
        let mailer = self.mailer.unwrap_or_else(|| Arc::new(NoopMailer));
        let sms = self.sms.unwrap_or_else(|| Arc::new(NoopSmsSender));
        let http = self.http.unwrap_or_else(|| Arc::new(ReqwestHttpClient::new(self.config.http_timeout_ms)));
        let push = self.push.unwrap_or_else(|| Arc::new(HttpPushSender::new(self.config.http_timeout_ms)));

        let actions = ActionExecutor::new(mailer, sms, http, push, notifications, subscriptions);

        WorkflowEngine::new(&self.config, executions, actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_with_defaults() {
        let _ = EngineBuilder::new().build();
    }

    #[test]
    fn test_build_with_custom_config() {
        let config = Config {
            loop_iteration_limit: 5,
            http_timeout_ms: 100,
        };
        let _ = EngineBuilder::new().config(config).build();
    }
}
