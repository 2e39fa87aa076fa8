use crate::client::{ApiClient, Reply};
use crate::config::{Endpoint, Endpoints};
use crate::envelope::Envelope;
use crate::error::Error;

use super::request::Payload;
use super::{CampaignBody, CampaignId};

pub type CampaignReply = Reply<Envelope<CampaignBody>>;

/// `POST {create_campaign}`
#[tracing::instrument(skip(client, endpoints, payload))]
pub async fn create_campaign(
    client: &ApiClient,
    endpoints: &Endpoints,
    payload: &Payload,
) -> Result<CampaignReply, Error> {
    let url = endpoints.url(Endpoint::CreateCampaign, &[]);
    client.post(&url, payload).await
}

/// `GET {get_campaign}/{id}`
#[tracing::instrument(skip(client, endpoints))]
pub async fn get_campaign_by_id(
    client: &ApiClient,
    endpoints: &Endpoints,
    campaign_id: &CampaignId,
) -> Result<CampaignReply, Error> {
    let url = endpoints.url(Endpoint::GetCampaign, &[campaign_id.as_str()]);
    client.get(&url).await
}

/// `PATCH {update_campaign}/{id}/name`
#[tracing::instrument(skip(client, endpoints, payload))]
pub async fn update_campaign_name(
    client: &ApiClient,
    endpoints: &Endpoints,
    campaign_id: &CampaignId,
    payload: &Payload,
) -> Result<CampaignReply, Error> {
    let url = endpoints.url(Endpoint::UpdateCampaign, &[campaign_id.as_str(), "name"]);
    client.patch(&url, payload).await
}
