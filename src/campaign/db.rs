use async_trait::async_trait;
use mongodb::bson;
use serde::{Deserialize, Serialize};

use crate::database::MongoCampaignRecords;
use crate::error::Error;

/// A campaign document as the campaign service stores it. Only the fields
/// the harness checks are mapped.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PersistedCampaign {
    pub name: String,
}

#[async_trait]
pub trait CampaignRecords: Send + Sync {
    /// Returns the stored name if a campaign with exactly `name` exists.
    async fn find_campaign_by_name(&self, name: &str) -> Result<Option<String>, Error>;
}

#[async_trait]
impl CampaignRecords for MongoCampaignRecords {
    #[tracing::instrument(skip(self))]
    async fn find_campaign_by_name(&self, name: &str) -> Result<Option<String>, Error> {
        let campaign: Option<PersistedCampaign> =
            self.find_one(bson::doc! { "name": name }, None).await?;

        Ok(campaign.map(|campaign| campaign.name))
    }
}
