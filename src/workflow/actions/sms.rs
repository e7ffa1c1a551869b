use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    FlowError, Result,
    common::Vars,
    delivery::SmsSender,
    runtime::ExecutionContext,
    workflow::template,
};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SmsAction {
    #[serde(default)]
    pub to: String,
    pub message: Option<String>,
}

impl SmsAction {
    pub(crate) fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "to": { "type": "string" },
                "message": { "type": "string" }
            }
        })
    }

    pub async fn execute(
        &self,
        sms: &dyn SmsSender,
        ctx: &ExecutionContext,
    ) -> Result<Vars> {
        let message = self.message.as_deref().ok_or(FlowError::Validation("sms action requires 'message'".to_string()))?;

        let to = template::replace_variables(ctx, &self.to);
        let message = template::replace_variables(ctx, message);

        sms.send(&to, &message).await?;

        Ok(Vars::new().with("sent", true).with("to", &to))
    }
}
