use std::future::Future;
use std::str::FromStr;

use chrono::Utc;
use serde_json::json;
use tracing::warn;

use crate::campaign::request::{CreateCampaignRequest, Payload, UpdateCampaignRequest};
use crate::campaign::{endpoints, manager, CampaignBody, CampaignId};
use crate::client::Reply;
use crate::collaborator;
use crate::envelope::ErrorCode;
use crate::error::Error;

use super::{check_eq, Category, Harness, Stage, Trace};

const EMAIL_TEMPLATE_ID: &str = "EM-001";
const RECIPIENT_LIST_ID: &str = "RL-001";
const MISSING_CAMPAIGN_ID: &str = "0";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Scenario {
    CreateValidCampaign,
    CreateWithUnknownEmailTemplate,
    CreateWithUnknownRecipientList,
    CreateWithNegativeScheduledTime,
    GetCampaignById,
    GetMissingCampaign,
    UpdateCampaignName,
    UpdateMissingCampaign,
    UpdateWithBlankName,
    CreateWithBlankName,
    CreateDuplicateCampaign,
    CreateWithoutCampaignName,
    CreateWithCollaboratorIds,
    CreateWhileEmailTemplateServiceDown,
    CreateWithListWhileEmailTemplateServiceDown,
    CreateWithTemplateWhileRecipientListServiceDown,
}

impl Scenario {
    pub const ALL: [Scenario; 16] = [
        Scenario::CreateValidCampaign,
        Scenario::CreateWithUnknownEmailTemplate,
        Scenario::CreateWithUnknownRecipientList,
        Scenario::CreateWithNegativeScheduledTime,
        Scenario::GetCampaignById,
        Scenario::GetMissingCampaign,
        Scenario::UpdateCampaignName,
        Scenario::UpdateMissingCampaign,
        Scenario::UpdateWithBlankName,
        Scenario::CreateWithBlankName,
        Scenario::CreateDuplicateCampaign,
        Scenario::CreateWithoutCampaignName,
        Scenario::CreateWithCollaboratorIds,
        Scenario::CreateWhileEmailTemplateServiceDown,
        Scenario::CreateWithListWhileEmailTemplateServiceDown,
        Scenario::CreateWithTemplateWhileRecipientListServiceDown,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::CreateValidCampaign => "create-valid-campaign",
            Scenario::CreateWithUnknownEmailTemplate => "create-with-unknown-email-template",
            Scenario::CreateWithUnknownRecipientList => "create-with-unknown-recipient-list",
            Scenario::CreateWithNegativeScheduledTime => "create-with-negative-scheduled-time",
            Scenario::GetCampaignById => "get-campaign-by-id",
            Scenario::GetMissingCampaign => "get-missing-campaign",
            Scenario::UpdateCampaignName => "update-campaign-name",
            Scenario::UpdateMissingCampaign => "update-missing-campaign",
            Scenario::UpdateWithBlankName => "update-with-blank-name",
            Scenario::CreateWithBlankName => "create-with-blank-name",
            Scenario::CreateDuplicateCampaign => "create-duplicate-campaign",
            Scenario::CreateWithoutCampaignName => "create-without-campaign-name",
            Scenario::CreateWithCollaboratorIds => "create-with-collaborator-ids",
            Scenario::CreateWhileEmailTemplateServiceDown => {
                "create-while-email-template-service-down"
            }
            Scenario::CreateWithListWhileEmailTemplateServiceDown => {
                "create-with-list-while-email-template-service-down"
            }
            Scenario::CreateWithTemplateWhileRecipientListServiceDown => {
                "create-with-template-while-recipient-list-service-down"
            }
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Scenario::CreateWithCollaboratorIds => Category::Integration,
            Scenario::CreateWhileEmailTemplateServiceDown
            | Scenario::CreateWithListWhileEmailTemplateServiceDown
            | Scenario::CreateWithTemplateWhileRecipientListServiceDown => Category::Down,
            _ => Category::EndToEnd,
        }
    }

    pub fn from_name(name: &str) -> Option<Scenario> {
        Scenario::ALL
            .iter()
            .copied()
            .find(|scenario| scenario.name() == name)
    }

    /// The `named` scenarios in catalogue order, or else every scenario in
    /// `categories`. With neither, the end-to-end and integration scenarios.
    pub fn select(categories: &[Category], named: &[Scenario]) -> Vec<Scenario> {
        if !named.is_empty() {
            return Scenario::ALL
                .iter()
                .copied()
                .filter(|scenario| named.contains(scenario))
                .collect();
        }

        let categories = if categories.is_empty() {
            &Category::DEFAULT[..]
        } else {
            categories
        };

        Scenario::ALL
            .iter()
            .copied()
            .filter(|scenario| categories.contains(&scenario.category()))
            .collect()
    }

    pub async fn run(self, harness: &Harness<'_>, trace: &mut Trace) -> Result<(), Error> {
        match self {
            Scenario::CreateValidCampaign => create_valid_campaign(harness, trace).await,
            Scenario::CreateWithUnknownEmailTemplate => {
                create_rejected(
                    harness,
                    trace,
                    CreateCampaignRequest::new(
                        unique_name("parthacam"),
                        "EM",
                        RECIPIENT_LIST_ID,
                        0,
                    )?,
                    ErrorCode::EmailTemplateNotFound,
                )
                .await
            }
            Scenario::CreateWithUnknownRecipientList => {
                create_rejected(
                    harness,
                    trace,
                    CreateCampaignRequest::new(
                        unique_name("parthacam"),
                        EMAIL_TEMPLATE_ID,
                        "RL-00",
                        0,
                    )?,
                    ErrorCode::RecipientListNotFound,
                )
                .await
            }
            Scenario::CreateWithNegativeScheduledTime => {
                create_with_negative_scheduled_time(harness, trace).await
            }
            Scenario::GetCampaignById => get_campaign_by_id(harness, trace).await,
            Scenario::GetMissingCampaign => get_missing_campaign(harness, trace).await,
            Scenario::UpdateCampaignName => update_campaign_name(harness, trace).await,
            Scenario::UpdateMissingCampaign => update_missing_campaign(harness, trace).await,
            Scenario::UpdateWithBlankName => update_with_blank_name(harness, trace).await,
            Scenario::CreateWithBlankName => {
                create_rejected(
                    harness,
                    trace,
                    CreateCampaignRequest::new(" ", EMAIL_TEMPLATE_ID, RECIPIENT_LIST_ID, 0)?,
                    ErrorCode::InputValidationError,
                )
                .await
            }
            Scenario::CreateDuplicateCampaign => create_duplicate_campaign(harness, trace).await,
            Scenario::CreateWithoutCampaignName => {
                create_without_campaign_name(harness, trace).await
            }
            Scenario::CreateWithCollaboratorIds => {
                create_with_collaborator_ids(harness, trace).await
            }
            Scenario::CreateWhileEmailTemplateServiceDown => {
                create_while_email_template_service_down(harness, trace).await
            }
            Scenario::CreateWithListWhileEmailTemplateServiceDown => {
                create_with_list_while_email_template_service_down(harness, trace).await
            }
            Scenario::CreateWithTemplateWhileRecipientListServiceDown => {
                create_with_template_while_recipient_list_service_down(harness, trace).await
            }
        }
    }
}

impl FromStr for Scenario {
    type Err = String;

    fn from_str(name: &str) -> Result<Scenario, String> {
        Scenario::from_name(name).ok_or_else(|| {
            let known: Vec<&str> = Scenario::ALL.iter().map(Scenario::name).collect();
            format!("unknown scenario '{}', expected one of: {}", name, known.join(", "))
        })
    }
}

fn unique_name(prefix: &str) -> String {
    format!("{}{}", prefix, Utc::now().format("%H%M%S%6f"))
}

/// Awaits `call` as the SendRequest stage; a missing response fails it.
async fn send<T, F>(trace: &mut Trace, call: F) -> Result<T, Error>
where
    F: Future<Output = Result<Reply<T>, Error>>,
{
    trace.enter(Stage::SendRequest);
    let body = call.await?.into_received()?;
    trace.enter(Stage::AssertEnvelope);
    Ok(body)
}

fn expect_campaign_matches(
    body: &CampaignBody,
    request: &CreateCampaignRequest,
) -> Result<(), Error> {
    check_eq(
        "data.campaignName",
        request.campaign_name(),
        body.campaign_name.as_str(),
    )?;
    check_eq(
        "data.emailTemplateId",
        request.email_template_id(),
        body.email_template_id.as_str(),
    )?;
    check_eq(
        "data.recipientListId",
        request.recipient_list_id(),
        body.recipient_list_id.as_str(),
    )?;
    check_eq(
        "data.scheduledTime",
        &request.scheduled_time(),
        &body.scheduled_time,
    )
}

async fn verify_persisted(
    harness: &Harness<'_>,
    trace: &mut Trace,
    name: &str,
) -> Result<(), Error> {
    let records = match harness.records {
        Some(records) => records,
        None => {
            warn!("no database configured, skipping persistence check for {}", name);
            return Ok(());
        }
    };

    trace.enter(Stage::WaitForConsistency);
    let stored = manager::await_campaign_persisted(records, name, &harness.consistency).await?;

    trace.enter(Stage::VerifyPersistence);
    check_eq("persisted name", name, stored.as_str())
}

async fn create_accepted(
    harness: &Harness<'_>,
    trace: &mut Trace,
    request: &CreateCampaignRequest,
) -> Result<CampaignBody, Error> {
    let payload = request.payload()?;
    let envelope = send(
        trace,
        endpoints::create_campaign(harness.client, harness.endpoints, &payload),
    )
    .await?;

    let body = envelope.expect_success()?;
    expect_campaign_matches(&body, request)?;

    Ok(body)
}

async fn create_rejected(
    harness: &Harness<'_>,
    trace: &mut Trace,
    request: CreateCampaignRequest,
    code: ErrorCode,
) -> Result<(), Error> {
    let payload = request.payload()?;
    send_rejected_create(harness, trace, &payload, code)
        .await
        .map(|_| ())
}

async fn send_rejected_create(
    harness: &Harness<'_>,
    trace: &mut Trace,
    payload: &Payload,
    code: ErrorCode,
) -> Result<Option<String>, Error> {
    let envelope = send(
        trace,
        endpoints::create_campaign(harness.client, harness.endpoints, payload),
    )
    .await?;

    let error = envelope.expect_failure(code)?;
    Ok(error.detail.clone())
}

async fn create_valid_campaign(harness: &Harness<'_>, trace: &mut Trace) -> Result<(), Error> {
    let request = CreateCampaignRequest::new(
        unique_name("partha"),
        EMAIL_TEMPLATE_ID,
        RECIPIENT_LIST_ID,
        0,
    )?;

    create_accepted(harness, trace, &request).await?;
    verify_persisted(harness, trace, request.campaign_name()).await
}

async fn create_with_negative_scheduled_time(
    harness: &Harness<'_>,
    trace: &mut Trace,
) -> Result<(), Error> {
    let name = unique_name("parthacamcam1");

    // the local model refuses this outright, so it is sent unchecked
    let locally_rejected =
        CreateCampaignRequest::new(name.as_str(), EMAIL_TEMPLATE_ID, RECIPIENT_LIST_ID, -1)
            .is_err();
    check_eq("local validation rejects -1", &true, &locally_rejected)?;

    let payload = Payload::unchecked(json!({
        "campaignName": name,
        "emailTemplateId": EMAIL_TEMPLATE_ID,
        "recipientListId": RECIPIENT_LIST_ID,
        "scheduledTime": -1,
    }));
    send_rejected_create(harness, trace, &payload, ErrorCode::InputValidationError)
        .await
        .map(|_| ())
}

async fn create_without_campaign_name(
    harness: &Harness<'_>,
    trace: &mut Trace,
) -> Result<(), Error> {
    let payload = Payload::unchecked(json!({
        "emailTemplateId": EMAIL_TEMPLATE_ID,
        "recipientListId": RECIPIENT_LIST_ID,
        "scheduledTime": 0,
    }));
    send_rejected_create(harness, trace, &payload, ErrorCode::InputValidationError)
        .await
        .map(|_| ())
}

async fn get_campaign_by_id(harness: &Harness<'_>, trace: &mut Trace) -> Result<(), Error> {
    let request = CreateCampaignRequest::new(
        unique_name("parthacam221"),
        EMAIL_TEMPLATE_ID,
        RECIPIENT_LIST_ID,
        10,
    )?;

    let created = create_accepted(harness, trace, &request).await?;
    verify_persisted(harness, trace, request.campaign_name()).await?;

    let envelope = send(
        trace,
        endpoints::get_campaign_by_id(harness.client, harness.endpoints, &created.id),
    )
    .await?;
    let fetched = envelope.expect_success()?;

    check_eq("fetched campaign", &created, &fetched)
}

async fn get_missing_campaign(harness: &Harness<'_>, trace: &mut Trace) -> Result<(), Error> {
    let envelope = send(
        trace,
        endpoints::get_campaign_by_id(
            harness.client,
            harness.endpoints,
            &CampaignId::from(MISSING_CAMPAIGN_ID),
        ),
    )
    .await?;

    envelope.expect_failure(ErrorCode::CampaignNotFound)?;
    Ok(())
}

async fn update_campaign_name(harness: &Harness<'_>, trace: &mut Trace) -> Result<(), Error> {
    let request = CreateCampaignRequest::new(
        unique_name("OriginalCampaign_"),
        EMAIL_TEMPLATE_ID,
        RECIPIENT_LIST_ID,
        0,
    )?;
    let created = create_accepted(harness, trace, &request).await?;

    trace.enter(Stage::BuildPayload);
    let update = UpdateCampaignRequest::new(unique_name("UpdatedCampaign_"))?;
    let payload = update.payload()?;
    let envelope = send(
        trace,
        endpoints::update_campaign_name(harness.client, harness.endpoints, &created.id, &payload),
    )
    .await?;
    let updated = envelope.expect_success()?;

    check_eq(
        "data.campaignName",
        update.campaign_name(),
        updated.campaign_name.as_str(),
    )?;
    check_eq("data.id", &created.id, &updated.id)?;
    verify_persisted(harness, trace, update.campaign_name()).await
}

async fn update_rejected(
    harness: &Harness<'_>,
    trace: &mut Trace,
    campaign_id: &CampaignId,
    name: &str,
    code: ErrorCode,
) -> Result<(), Error> {
    let payload = UpdateCampaignRequest::new(name)?.payload()?;
    let envelope = send(
        trace,
        endpoints::update_campaign_name(harness.client, harness.endpoints, campaign_id, &payload),
    )
    .await?;

    envelope.expect_failure(code)?;
    Ok(())
}

async fn update_missing_campaign(harness: &Harness<'_>, trace: &mut Trace) -> Result<(), Error> {
    update_rejected(
        harness,
        trace,
        &CampaignId::from(MISSING_CAMPAIGN_ID),
        "cam",
        ErrorCode::CampaignNotFound,
    )
    .await
}

// renames a campaign that exists, so only the name can be at fault
async fn update_with_blank_name(harness: &Harness<'_>, trace: &mut Trace) -> Result<(), Error> {
    let request = CreateCampaignRequest::new(
        unique_name("BlankRename_"),
        EMAIL_TEMPLATE_ID,
        RECIPIENT_LIST_ID,
        0,
    )?;
    let created = create_accepted(harness, trace, &request).await?;

    trace.enter(Stage::BuildPayload);
    update_rejected(
        harness,
        trace,
        &created.id,
        " ",
        ErrorCode::InputValidationError,
    )
    .await
}

async fn create_duplicate_campaign(harness: &Harness<'_>, trace: &mut Trace) -> Result<(), Error> {
    let request = CreateCampaignRequest::new(
        unique_name("Test_partha"),
        EMAIL_TEMPLATE_ID,
        RECIPIENT_LIST_ID,
        0,
    )?;
    create_accepted(harness, trace, &request).await?;

    // creating is not idempotent: the same request again must be refused
    trace.enter(Stage::BuildPayload);
    create_rejected(harness, trace, request, ErrorCode::CampaignNameNotUnique).await
}

async fn create_with_collaborator_ids(
    harness: &Harness<'_>,
    trace: &mut Trace,
) -> Result<(), Error> {
    let templates = send(
        trace,
        collaborator::get_email_templates(harness.client, harness.endpoints),
    )
    .await?
    .expect_success()?;
    let first_template = templates
        .first()
        .ok_or_else(|| Error::assertion("data[0]", "an email template", "no templates"))?;
    let template = send(
        trace,
        collaborator::get_email_template_by_id(
            harness.client,
            harness.endpoints,
            &first_template.id,
        ),
    )
    .await?
    .expect_success()?;

    let lists = send(
        trace,
        collaborator::get_recipient_lists(harness.client, harness.endpoints),
    )
    .await?
    .expect_success()?;
    let first_list = lists
        .first()
        .ok_or_else(|| Error::assertion("data[0]", "a recipient list", "no lists"))?;
    let list = send(
        trace,
        collaborator::get_recipient_list_by_id(harness.client, harness.endpoints, &first_list.id),
    )
    .await?
    .expect_success()?;

    trace.enter(Stage::BuildPayload);
    let request = CreateCampaignRequest::new(
        unique_name("parthacam"),
        template.id.as_str(),
        list.id.as_str(),
        0,
    )?;
    let created = create_accepted(harness, trace, &request).await?;

    check_eq("data.emailTemplateId", &template.id, &created.email_template_id)?;
    check_eq("data.recipientListId", &list.id, &created.recipient_list_id)
}

/// Only the path of the failed lookup is checked in `detail`; its host
/// depends on where the service runs.
async fn create_while_email_template_service_down(
    harness: &Harness<'_>,
    trace: &mut Trace,
) -> Result<(), Error> {
    let request = CreateCampaignRequest::new(
        unique_name("Test Campaign"),
        EMAIL_TEMPLATE_ID,
        RECIPIENT_LIST_ID,
        0,
    )?;
    let payload = request.payload()?;

    let detail =
        send_rejected_create(harness, trace, &payload, ErrorCode::InternalServerError).await?;

    let lookup = format!("/email/templates/{}", EMAIL_TEMPLATE_ID);
    let detail = detail.unwrap_or_default();
    if !detail.contains(&lookup) {
        return Err(Error::assertion(
            "errors[0].detail",
            format!("mentions {}", lookup),
            detail,
        ));
    }
    Ok(())
}

async fn create_with_list_while_email_template_service_down(
    harness: &Harness<'_>,
    trace: &mut Trace,
) -> Result<(), Error> {
    let lists = send(
        trace,
        collaborator::get_recipient_lists(harness.client, harness.endpoints),
    )
    .await?
    .expect_success()?;
    let list = lists
        .first()
        .ok_or_else(|| Error::assertion("data[0]", "a recipient list", "no lists"))?;

    trace.enter(Stage::BuildPayload);
    let request = CreateCampaignRequest::new(
        unique_name("parthacam_email_down"),
        "EM-SIMULATE-DOWN",
        list.id.as_str(),
        0,
    )?;
    create_rejected(harness, trace, request, ErrorCode::InternalServerError).await
}

async fn create_with_template_while_recipient_list_service_down(
    harness: &Harness<'_>,
    trace: &mut Trace,
) -> Result<(), Error> {
    let templates = send(
        trace,
        collaborator::get_email_templates(harness.client, harness.endpoints),
    )
    .await?
    .expect_success()?;
    let template = templates
        .first()
        .ok_or_else(|| Error::assertion("data[0]", "an email template", "no templates"))?;

    trace.enter(Stage::BuildPayload);
    let request = CreateCampaignRequest::new(
        unique_name("parthacam_recipient_down"),
        template.id.as_str(),
        "RL-SIMULATE-DOWN",
        0,
    )?;
    create_rejected(harness, trace, request, ErrorCode::InternalServerError).await
}
