use serde::Serialize;

use crate::error::Error;
use crate::violations::Violation;

/// A serialized request body, ready to be sent.
#[derive(Clone, Debug, PartialEq)]
pub struct Payload(String);

impl Payload {
    /// Sends `value` as-is, bypassing local validation.
    ///
    /// Only for scenarios that need the service itself to reject the input.
    pub fn unchecked(value: serde_json::Value) -> Payload {
        Payload(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn serialize<T: Serialize>(value: &T) -> Result<Payload, Error> {
        serde_json::to_string(value)
            .map(Payload)
            .map_err(Error::FailedToSerializeToJson)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    campaign_name: String,
    email_template_id: String,
    recipient_list_id: String,
    scheduled_time: i64,
}

impl CreateCampaignRequest {
    pub fn new(
        campaign_name: impl Into<String>,
        email_template_id: impl Into<String>,
        recipient_list_id: impl Into<String>,
        scheduled_time: i64,
    ) -> Result<CreateCampaignRequest, Error> {
        let request = CreateCampaignRequest {
            campaign_name: campaign_name.into(),
            email_template_id: email_template_id.into(),
            recipient_list_id: recipient_list_id.into(),
            scheduled_time,
        };

        let mut violations = vec![];
        require_text(&mut violations, "campaignName", &request.campaign_name);
        require_text(&mut violations, "emailTemplateId", &request.email_template_id);
        require_text(&mut violations, "recipientListId", &request.recipient_list_id);
        if request.scheduled_time < 0 {
            violations.push(Violation::ScheduledTimeNegative {
                scheduled_time: request.scheduled_time,
            });
        }

        if !violations.is_empty() {
            return Err(Error::InvalidRequest { violations });
        }

        Ok(request)
    }

    pub fn campaign_name(&self) -> &str {
        &self.campaign_name
    }

    pub fn email_template_id(&self) -> &str {
        &self.email_template_id
    }

    pub fn recipient_list_id(&self) -> &str {
        &self.recipient_list_id
    }

    pub fn scheduled_time(&self) -> i64 {
        self.scheduled_time
    }

    pub fn payload(&self) -> Result<Payload, Error> {
        Payload::serialize(self)
    }
}

/// Renames a campaign; the campaign id travels in the url.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaignRequest {
    campaign_name: String,
}

impl UpdateCampaignRequest {
    pub fn new(campaign_name: impl Into<String>) -> Result<UpdateCampaignRequest, Error> {
        let request = UpdateCampaignRequest {
            campaign_name: campaign_name.into(),
        };

        let mut violations = vec![];
        require_text(&mut violations, "campaignName", &request.campaign_name);
        if !violations.is_empty() {
            return Err(Error::InvalidRequest { violations });
        }

        Ok(request)
    }

    pub fn campaign_name(&self) -> &str {
        &self.campaign_name
    }

    pub fn payload(&self) -> Result<Payload, Error> {
        Payload::serialize(self)
    }
}

// length only: whitespace is the service's call
fn require_text(violations: &mut Vec<Violation>, field: &str, value: &str) {
    if value.is_empty() {
        violations.push(Violation::FieldEmpty {
            field: field.to_string(),
        });
    }
}
