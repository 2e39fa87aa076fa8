use std::fmt::{Debug, Display};
use std::io::Error as IoError;

use config::ConfigError;
use derivative::Derivative;
use mongodb::error::Error as DatabaseError;
use serde::{Serialize, Serializer};
use serde_json::Error as JsonError;

use crate::violations::Violation;

#[derive(Debug, Serialize, Derivative)]
#[derivative(PartialEq)]
#[serde(untagged)]
pub enum Error {
    // rejected locally, never sent
    InvalidRequest {
        violations: Vec<Violation>,
    },
    #[serde(serialize_with = "display")]
    InvalidConfig(#[derivative(PartialEq = "ignore")] ConfigError),

    // transport and decoding
    NoResponse {
        url: String,
        reason: String,
    },
    UndecodableBody {
        url: String,
        status: u16,
        #[serde(serialize_with = "display")]
        #[derivative(PartialEq = "ignore")]
        source: JsonError,
    },

    // scenario checks
    AssertionFailed {
        check: String,
        expected: String,
        actual: String,
    },
    PersistenceTimeout {
        name: String,
        attempts: u32,
    },

    // infrastructure
    #[serde(serialize_with = "display")]
    FailedDatabaseCall(#[derivative(PartialEq = "ignore")] DatabaseError),
    #[serde(serialize_with = "display")]
    FailedToSerializeToJson(#[derivative(PartialEq = "ignore")] JsonError),
    #[serde(serialize_with = "display")]
    IoError(#[derivative(PartialEq = "ignore")] IoError),
}

impl Error {
    pub fn assertion(check: &str, expected: impl Debug, actual: impl Debug) -> Error {
        Error::AssertionFailed {
            check: check.to_owned(),
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Error::InvalidRequest { .. } => "HAR-E-001",
            Error::InvalidConfig(_) => "HAR-E-002",
            Error::NoResponse { .. } => "HAR-E-101",
            Error::UndecodableBody { .. } => "HAR-E-102",
            Error::AssertionFailed { .. } => "HAR-E-201",
            Error::PersistenceTimeout { .. } => "HAR-E-202",
            Error::FailedDatabaseCall(_) => "HAR-E-301",
            Error::FailedToSerializeToJson(_) => "HAR-E-302",
            Error::IoError(_) => "HAR-E-303",
        }
    }

    pub fn error_message(&self) -> &'static str {
        match self {
            Error::InvalidRequest { .. } => "The request was rejected before it was sent",
            Error::InvalidConfig(_) => "The harness configuration could not be loaded",
            Error::NoResponse { .. } => "The service did not respond",
            Error::UndecodableBody { .. } => "The service responded with an undecodable body",
            Error::AssertionFailed { .. } => "The response did not match the expectation",
            Error::PersistenceTimeout { .. } => {
                "The campaign did not appear in the database in time"
            }
            Error::FailedDatabaseCall(_) => {
                "An error occurred when communicating with the database"
            }
            Error::FailedToSerializeToJson(_) => {
                "An error occurred when serializing a request to json"
            }
            Error::IoError(_) => "An error occurred during an I/O operation",
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        Debug::fmt(self, f)
    }
}

impl From<ConfigError> for Error {
    fn from(error: ConfigError) -> Error {
        Error::InvalidConfig(error)
    }
}

impl From<DatabaseError> for Error {
    fn from(error: DatabaseError) -> Error {
        Error::FailedDatabaseCall(error)
    }
}

impl From<IoError> for Error {
    fn from(error: IoError) -> Error {
        Error::IoError(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidConfig(err) => Some(err),
            Error::UndecodableBody { source, .. } => Some(source),
            Error::FailedDatabaseCall(err) => Some(err),
            Error::FailedToSerializeToJson(err) => Some(err),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

fn display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Display,
    S: Serializer,
{
    serializer.collect_str(value)
}
