use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{
    FlowError, Result,
    common::Vars,
    delivery::HttpClient,
    runtime::ExecutionContext,
    workflow::template,
};

fn default_method() -> String {
    "POST".to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WebhookAction {
    pub url: Option<String>,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

impl Default for WebhookAction {
    fn default() -> Self {
        Self {
            url: None,
            method: default_method(),
            headers: HashMap::new(),
            body: None,
        }
    }
}

impl WebhookAction {
    pub(crate) fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "url": { "type": "string" },
                "method": {
                    "type": "string",
                    "enum": ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"]
                },
                "headers": {
                    "type": "object",
                    "additionalProperties": { "type": "string" }
                },
                "body": {}
            }
        })
    }

    pub async fn execute(
        &self,
        http: &dyn HttpClient,
        ctx: &ExecutionContext,
    ) -> Result<Vars> {
        // Validated before anything touches the network.
        let url = self.url.as_deref().ok_or(FlowError::Validation("webhook action requires 'url'".to_string()))?;

        let url = template::replace_variables(ctx, url);
        let body = self.body.as_ref().map(|body| match body {
            Value::String(text) => Value::String(template::replace_variables(ctx, text)),
            other => other.clone(),
        });

        let res = http.request(&url, &self.method, &self.headers, body.as_ref()).await?;

        Ok(Vars::new().with("delivered", true).with("url", &url).with("status", res.status))
    }
}
