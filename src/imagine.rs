//! Client for the Imagine (vyro.ai) image-to-video REST API.

use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::info;

use crate::common::errors::Error;
use crate::poll::PollPolicy;

pub const SUBMIT_PATH: &str = "/v2/video/image-to-video";
pub const STATUS_PATH: &str = "/v2/video/status";
pub const IMAGE_FILE_NAME: &str = "image.jpg";
pub const COMPLETED_STATUS: &str = "completed";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared HTTP client; one per container.
pub fn http_client() -> Result<reqwest::Client, Error> {
    let client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .build()?;

    Ok(client)
}

/// Outcome of a submission: either a job to poll or a finished video.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Job(String),
    Ready(String),
}

#[derive(Debug, Deserialize)]
struct SubmissionResponse {
    #[serde(default, deserialize_with = "opaque_id")]
    id: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    video_url: Option<String>,
}

impl TryFrom<SubmissionResponse> for Submission {
    type Error = Error;

    fn try_from(response: SubmissionResponse) -> Result<Self, Self::Error> {
        if let Some(id) = response.id {
            return Ok(Submission::Job(id));
        }

        first_present(response.url, response.video_url)
            .map(Submission::Ready)
            .ok_or(Error::MissingVideoUrl)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderStatus {
    pub status: String,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl ProviderStatus {
    pub fn is_completed(&self) -> bool {
        self.status == COMPLETED_STATUS
    }

    pub fn into_video_url(self) -> Option<String> {
        first_present(self.video_url, self.url)
    }
}

/// Empty strings count as absent, like a falsy JSON value.
fn first_present(preferred: Option<String>, fallback: Option<String>) -> Option<String> {
    preferred
        .filter(|s| !s.is_empty())
        .or(fallback.filter(|s| !s.is_empty()))
}

/// Job ids are opaque; accept strings and numbers.
fn opaque_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let id = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(id)) if !id.is_empty() => Some(id),
        Some(Value::Number(id)) => Some(id.to_string()),
        _ => None,
    };

    Ok(id)
}

#[derive(Debug, Clone, Copy)]
pub struct ImagineClient<'a> {
    http: &'a reqwest::Client,
    base_url: &'a str,
    api_key: &'a str,
}

impl<'a> ImagineClient<'a> {
    pub fn new(http: &'a reqwest::Client, base_url: &'a str, api_key: &'a str) -> Self {
        Self {
            http,
            base_url,
            api_key,
        }
    }

    pub fn submit_url(&self) -> String {
        format!("{}{}", self.base_url, SUBMIT_PATH)
    }

    pub fn status_url(&self, job_id: &str) -> String {
        format!("{}{}/{}", self.base_url, STATUS_PATH, job_id)
    }

    /// Uploads the image with its prompt and style as one multipart request.
    pub async fn submit(
        &self,
        style: &str,
        prompt: &str,
        image: Vec<u8>,
    ) -> Result<Submission, Error> {
        let form = Form::new()
            .text("style", style.to_string())
            .text("prompt", prompt.to_string())
            .part("file", Part::bytes(image).file_name(IMAGE_FILE_NAME));

        let response = self
            .http
            .post(self.submit_url())
            .bearer_auth(self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Submission(response.status()));
        }

        let body: SubmissionResponse = response.json().await?;
        body.try_into()
    }

    pub async fn status(&self, job_id: &str) -> Result<ProviderStatus, Error> {
        let response = self
            .http
            .get(self.status_url(job_id))
            .bearer_auth(self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::StatusCheck(response.status()));
        }

        Ok(response.json().await?)
    }

    /// Polls the job under `policy` until the provider reports it completed.
    #[tracing::instrument(skip(self, policy))]
    pub async fn wait_for_video(&self, job_id: &str, policy: PollPolicy) -> Result<String, Error> {
        let outcome = policy
            .until_complete(|attempt| async move {
                let status = self.status(job_id).await?;
                info!(attempt, status = %status.status, "Job status");

                if !status.is_completed() {
                    return Ok::<_, Error>(None);
                }

                Ok(Some(status.into_video_url().ok_or(Error::MissingVideoUrl)))
            })
            .await;

        outcome.unwrap_or(Err(Error::Timeout))
    }
}
