use awc::http::header::{ACCEPT, CONTENT_TYPE};
use awc::{Client, ClientRequest};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::campaign::request::Payload;
use crate::config::HttpConfig;
use crate::error::Error;

const JSON: &str = "application/json";
const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

/// What came back from a single call.
///
/// A transport failure is not an error here: callers asserting on a
/// service being unreachable need to see it as a value.
#[derive(Debug)]
pub enum Reply<T> {
    Received { status: u16, body: T },
    NoResponse { url: String, reason: String },
}

impl<T> Reply<T> {
    pub fn into_received(self) -> Result<T, Error> {
        match self {
            Reply::Received { body, .. } => Ok(body),
            Reply::NoResponse { url, reason } => Err(Error::NoResponse { url, reason }),
        }
    }

    pub fn is_no_response(&self) -> bool {
        matches!(self, Reply::NoResponse { .. })
    }
}

/// Thin JSON client shared by every scenario in a run.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new(config: &HttpConfig) -> ApiClient {
        let client = Client::builder()
            .timeout(config.timeout())
            .add_default_header((ACCEPT, JSON))
            .add_default_header((CONTENT_TYPE, JSON))
            .finish();

        ApiClient { client }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<Reply<T>, Error> {
        self.exchange(self.client.get(url), None).await
    }

    #[tracing::instrument(skip(self, payload))]
    pub async fn post<T: DeserializeOwned>(
        &self,
        url: &str,
        payload: &Payload,
    ) -> Result<Reply<T>, Error> {
        self.exchange(self.client.post(url), Some(payload)).await
    }

    #[tracing::instrument(skip(self, payload))]
    pub async fn patch<T: DeserializeOwned>(
        &self,
        url: &str,
        payload: &Payload,
    ) -> Result<Reply<T>, Error> {
        self.exchange(self.client.patch(url), Some(payload)).await
    }

    async fn exchange<T: DeserializeOwned>(
        &self,
        request: ClientRequest,
        payload: Option<&Payload>,
    ) -> Result<Reply<T>, Error> {
        let url = request.get_uri().to_string();
        let sent = match payload {
            Some(payload) => {
                debug!(body = payload.as_str(), "sending request");
                request.send_body(payload.as_str().to_owned())
            }
            None => request.send(),
        };

        let mut response = match sent.await {
            Ok(response) => response,
            Err(err) => {
                warn!("no response from {}: {}", url, err);
                return Ok(Reply::NoResponse {
                    url,
                    reason: err.to_string(),
                });
            }
        };

        let status = response.status().as_u16();
        let bytes = match response.body().limit(MAX_BODY_BYTES).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("response from {} was cut short: {}", url, err);
                return Ok(Reply::NoResponse {
                    url,
                    reason: err.to_string(),
                });
            }
        };
        debug!(status, body = %String::from_utf8_lossy(&bytes), "received response");

        let body = serde_json::from_slice(&bytes)
            .map_err(|source| Error::UndecodableBody { url, status, source })?;

        Ok(Reply::Received { status, body })
    }
}
