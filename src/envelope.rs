use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The `{meta, data, errors}` wrapper every service under test responds with.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: Meta,
    pub data: Option<T>,
    pub errors: Option<Vec<ApiError>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Meta {
    pub status: Status,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Success,
    Failure,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    pub error_code: String,
    pub message: String,
    #[serde(default)]
    pub detail: Option<String>,
}

/// Error codes the campaign service is contracted to report.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    CampaignNotFound,
    EmailTemplateNotFound,
    RecipientListNotFound,
    CampaignNameNotUnique,
    InternalServerError,
    InputValidationError,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 6] = [
        ErrorCode::CampaignNotFound,
        ErrorCode::EmailTemplateNotFound,
        ErrorCode::RecipientListNotFound,
        ErrorCode::CampaignNameNotUnique,
        ErrorCode::InternalServerError,
        ErrorCode::InputValidationError,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ErrorCode::CampaignNotFound => "CAM-E-001",
            ErrorCode::EmailTemplateNotFound => "CAM-E-002",
            ErrorCode::RecipientListNotFound => "CAM-E-003",
            ErrorCode::CampaignNameNotUnique => "CAM-E-004",
            ErrorCode::InternalServerError => "BAS-E-001",
            ErrorCode::InputValidationError => "BAS-E-002",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::CampaignNotFound => "Campaign not found",
            ErrorCode::EmailTemplateNotFound => "Email Template Not Found",
            ErrorCode::RecipientListNotFound => "Recipient List Not Found",
            ErrorCode::CampaignNameNotUnique => "Campaign Name must be unique",
            ErrorCode::InternalServerError => "Internal Server Error",
            ErrorCode::InputValidationError => "Input Validation Error",
        }
    }

    pub fn from_code(code: &str) -> Option<ErrorCode> {
        ErrorCode::ALL.iter().copied().find(|known| known.code() == code)
    }

    pub fn to_api_error(&self, detail: Option<String>) -> ApiError {
        ApiError {
            error_code: self.code().to_string(),
            message: self.message().to_string(),
            detail,
        }
    }
}

impl<T> Envelope<T> {
    pub fn success(data: T) -> Envelope<T> {
        Envelope {
            meta: Meta {
                status: Status::Success,
            },
            data: Some(data),
            errors: None,
        }
    }

    pub fn failure(errors: Vec<ApiError>) -> Envelope<T> {
        Envelope {
            meta: Meta {
                status: Status::Failure,
            },
            data: None,
            errors: Some(errors),
        }
    }

    pub fn errors(&self) -> &[ApiError] {
        self.errors.as_deref().unwrap_or(&[])
    }

    /// Requires `SUCCESS` with a `data` payload and hands the payload over.
    pub fn expect_success(self) -> Result<T, Error> {
        if self.meta.status != Status::Success {
            return Err(Error::assertion(
                "meta.status",
                Status::Success,
                (self.meta.status, self.errors()),
            ));
        }

        self.data
            .ok_or_else(|| Error::assertion("data", "a payload", "nothing"))
    }

    /// Requires `FAILURE` whose first error carries `code` and its message.
    pub fn expect_failure(&self, code: ErrorCode) -> Result<&ApiError, Error> {
        if self.meta.status != Status::Failure {
            return Err(Error::assertion(
                "meta.status",
                Status::Failure,
                self.meta.status,
            ));
        }

        let first = self
            .errors()
            .first()
            .ok_or_else(|| Error::assertion("errors[0]", code.code(), "no errors"))?;

        if first.error_code != code.code() {
            return Err(Error::assertion(
                "errors[0].errorCode",
                code.code(),
                &first.error_code,
            ));
        }
        if first.message != code.message() {
            return Err(Error::assertion(
                "errors[0].message",
                code.message(),
                &first.message,
            ));
        }

        Ok(first)
    }
}
