use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    FlowError, Result,
    common::Vars,
    delivery::Mailer,
    runtime::ExecutionContext,
    workflow::template,
};

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EmailAction {
    pub to: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
}

impl EmailAction {
    pub(crate) fn schema() -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "to": { "type": "string" },
                "subject": { "type": "string" },
                "body": { "type": "string" }
            }
        })
    }

    pub async fn execute(
        &self,
        mailer: &dyn Mailer,
        ctx: &ExecutionContext,
    ) -> Result<Vars> {
        let to = self.to.as_deref().ok_or(FlowError::Validation("email action requires 'to'".to_string()))?;

        let to = template::replace_variables(ctx, to);
        let subject = template::replace_variables(ctx, &self.subject);
        let body = template::replace_variables(ctx, &self.body);

        mailer.send(&to, &subject, &body).await?;

        Ok(Vars::new().with("sent", true).with("to", &to).with("subject", &subject))
    }
}
