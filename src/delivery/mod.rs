//! Delivery collaborators for side-effecting actions.
//!
//! Every transport the action executor touches is behind a trait so
//! embedders can swap in their own senders and tests can record calls.
//! `delivery::http` carries the reqwest-backed reference implementations;
//! mail and SMS ship as tracing-only stubs.

mod http;

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tracing::info;

use crate::{Result, store::data::PushSubscription};

pub use http::{HttpPushSender, ReqwestHttpClient};

/// Response surface the action executor needs from a webhook call.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
    ) -> Result<()>;
}

#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(
        &self,
        to: &str,
        message: &str,
    ) -> Result<()>;
}

#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn request(
        &self,
        url: &str,
        method: &str,
        headers: &HashMap<String, String>,
        body: Option<&Value>,
    ) -> Result<HttpResponse>;
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &Value,
    ) -> Result<()>;
}

/// Mail stub that logs instead of delivering.
#[derive(Debug, Clone, Default)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        _body: &str,
    ) -> Result<()> {
        info!(to = %to, subject = %subject, "mail delivery skipped (noop mailer)");
        Ok(())
    }
}

/// SMS stub that logs instead of delivering.
#[derive(Debug, Clone, Default)]
pub struct NoopSmsSender;

#[async_trait]
impl SmsSender for NoopSmsSender {
    async fn send(
        &self,
        to: &str,
        _message: &str,
    ) -> Result<()> {
        info!(to = %to, "sms delivery skipped (noop sender)");
        Ok(())
    }
}
