use serde::{Deserialize, Serialize};

use crate::collaborator::{EmailTemplateId, RecipientListId};
use crate::typedid::{TypedId, TypedIdMarker};

pub mod db;
pub mod endpoints;
pub mod manager;
pub mod request;

pub type CampaignId = TypedId<Campaign>;

pub struct Campaign;

impl TypedIdMarker for Campaign {
    fn tag() -> &'static str {
        "campaign"
    }
}

/// The `data` section of campaign responses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignBody {
    pub id: CampaignId,
    pub campaign_name: String,
    pub email_template_id: EmailTemplateId,
    pub recipient_list_id: RecipientListId,
    pub scheduled_time: i64,
}
