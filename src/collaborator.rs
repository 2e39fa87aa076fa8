use serde::{Deserialize, Serialize};

use crate::client::{ApiClient, Reply};
use crate::config::{Endpoint, Endpoints};
use crate::envelope::Envelope;
use crate::error::Error;
use crate::typedid::{TypedId, TypedIdMarker};

pub type EmailTemplateId = TypedId<EmailTemplate>;
pub type RecipientListId = TypedId<RecipientList>;

pub struct EmailTemplate;
pub struct RecipientList;

impl TypedIdMarker for EmailTemplate {
    fn tag() -> &'static str {
        "email-template"
    }
}

impl TypedIdMarker for RecipientList {
    fn tag() -> &'static str {
        "recipient-list"
    }
}

// The collaborators return more than this; only the id is relied upon.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmailTemplateBody {
    pub id: EmailTemplateId,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecipientListBody {
    pub id: RecipientListId,
}

#[tracing::instrument(skip(client, endpoints))]
pub async fn get_email_templates(
    client: &ApiClient,
    endpoints: &Endpoints,
) -> Result<Reply<Envelope<Vec<EmailTemplateBody>>>, Error> {
    client.get(&endpoints.url(Endpoint::EmailTemplate, &[])).await
}

#[tracing::instrument(skip(client, endpoints))]
pub async fn get_email_template_by_id(
    client: &ApiClient,
    endpoints: &Endpoints,
    template_id: &EmailTemplateId,
) -> Result<Reply<Envelope<EmailTemplateBody>>, Error> {
    let url = endpoints.url(Endpoint::EmailTemplate, &[template_id.as_str()]);
    client.get(&url).await
}

#[tracing::instrument(skip(client, endpoints))]
pub async fn get_recipient_lists(
    client: &ApiClient,
    endpoints: &Endpoints,
) -> Result<Reply<Envelope<Vec<RecipientListBody>>>, Error> {
    client.get(&endpoints.url(Endpoint::RecipientList, &[])).await
}

#[tracing::instrument(skip(client, endpoints))]
pub async fn get_recipient_list_by_id(
    client: &ApiClient,
    endpoints: &Endpoints,
    list_id: &RecipientListId,
) -> Result<Reply<Envelope<RecipientListBody>>, Error> {
    let url = endpoints.url(Endpoint::RecipientList, &[list_id.as_str()]);
    client.get(&url).await
}
