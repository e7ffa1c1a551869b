use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, InvalidHeaderValue};
use serde_json::Value;

use crate::{
    FlowError, Result,
    delivery::{HttpClient, HttpResponse, PushSender},
    store::data::PushSubscription,
};

/// Webhook transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestHttpClient {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    fn build_headers(headers: &HashMap<String, String>) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        map.insert(HeaderName::from_static("accept"), HeaderValue::from_static("*/*"));

        for (key, value) in headers {
            map.insert(
                key.parse::<HeaderName>().map_err(|err| FlowError::Runtime(err.to_string()))?,
                value.parse().map_err(|err: InvalidHeaderValue| FlowError::Runtime(err.to_string()))?,
            );
        }
        Ok(map)
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn request(
        &self,
        url: &str,
        method: &str,
        headers: &HashMap<String, String>,
        body: Option<&Value>,
    ) -> Result<HttpResponse> {
        let method = method.parse::<reqwest::Method>().map_err(|_| FlowError::Runtime(format!("invalid method '{}'", method)))?;

        let mut request = self.client.request(method, url).headers(Self::build_headers(headers)?).timeout(self.timeout);

        if let Some(body) = body {
            request = match body {
                Value::String(text) => request.body::<String>(text.clone()),
                json => request.json(json),
            };
        }

        let res = request.send().await.map_err(|err| FlowError::Delivery(format!("http error: {}", err)))?;

        Ok(HttpResponse {
            status: res.status().as_u16(),
            body: res.text().await.map_err(|err| FlowError::Delivery(err.to_string()))?,
        })
    }
}

/// Push transport that posts the payload to the subscription endpoint.
///
/// Expired or revoked endpoints answer 404/410; those are reported as
/// delivery errors carrying the status so callers can prune the record.
#[derive(Debug, Clone)]
pub struct HttpPushSender {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpPushSender {
    pub fn new(timeout_ms: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: Duration::from_millis(timeout_ms),
        }
    }
}

#[async_trait]
impl PushSender for HttpPushSender {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &Value,
    ) -> Result<()> {
        let res = self
            .client
            .post(&subscription.endpoint)
            .json(payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| FlowError::Delivery(format!("push error: {}", err)))?;

        match res.status().as_u16() {
            200..=299 => Ok(()),
            404 | 410 => Err(FlowError::Delivery(format!("push endpoint expired: status {}", res.status().as_u16()))),
            status => Err(FlowError::Delivery(format!("push rejected: status {}", status))),
        }
    }
}
