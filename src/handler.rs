use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use lambda_http::http::{Method, StatusCode};
use lambda_http::{Request, Response};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::common::errors::Error;
use crate::common::utils::{empty_response, extract_request, json_response};
use crate::config::Config;
use crate::imagine::{http_client, ImagineClient, Submission};

const MISSING_IMAGE_DATA_ERROR: &str = "imageUrl must be a data URI with base64 image data";
const EMPTY_IMAGE_DATA_ERROR: &str = "Image data is empty";

/// Browsers and canvas exports do not always pad their base64.
const IMAGE_DATA_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub prompt: String,
    pub image_url: String,
    #[serde(default)]
    pub style: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerationResponse {
    pub success: bool,
    pub video_url: String,
}

/// Decodes the base64 payload following the first comma of a data URI.
pub fn decode_image_data(image_url: &str) -> Result<Vec<u8>, Error> {
    let (_, payload) = image_url
        .split_once(',')
        .ok_or_else(|| Error::InvalidRequest(MISSING_IMAGE_DATA_ERROR.into()))?;

    let image = IMAGE_DATA_ENGINE.decode(payload.trim())?;
    if image.is_empty() {
        return Err(Error::InvalidRequest(EMPTY_IMAGE_DATA_ERROR.into()));
    }

    Ok(image)
}

pub struct VideoHandler {
    config: Config,
    http: reqwest::Client,
}

impl VideoHandler {
    pub fn new(config: Config) -> Result<Self, Error> {
        Ok(Self::with_http_client(config, http_client()?))
    }

    pub fn with_http_client(config: Config, http: reqwest::Client) -> Self {
        Self { config, http }
    }

    /// Every failure ends up here as a JSON error response.
    pub async fn handle(&self, request: Request) -> Response<String> {
        match self.process_request(request).await {
            Ok(response) => response,
            Err(err) => {
                error!("Error: {}", err);
                error_response(&err)
            }
        }
    }

    #[tracing::instrument(skip_all, fields(method = %request.method()))]
    async fn process_request(&self, request: Request) -> Result<Response<String>, Error> {
        match *request.method() {
            Method::OPTIONS => return empty_response(StatusCode::OK),
            Method::POST => {}
            _ => return Err(Error::MethodNotAllowed),
        }

        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(Error::MissingApiKey)?;

        let request = extract_request::<GenerationRequest>(&request)?;
        let style = request
            .style
            .as_deref()
            .unwrap_or(&self.config.default_style);
        let image = decode_image_data(&request.image_url)?;

        info!(
            style,
            prompt_len = request.prompt.len(),
            image_bytes = image.len(),
            "Submitting generation job"
        );
        let client = ImagineClient::new(&self.http, &self.config.base_url, api_key);

        let video_url = match client.submit(style, &request.prompt, image).await? {
            Submission::Job(job_id) => {
                info!("Polling job {}", job_id);
                client.wait_for_video(&job_id, self.config.poll).await?
            }
            Submission::Ready(video_url) => video_url,
        };

        info!("Video ready: {}", video_url);
        json_response(
            StatusCode::OK,
            &GenerationResponse {
                success: true,
                video_url,
            },
        )
    }
}

fn error_response(err: &Error) -> Response<String> {
    json_response(err.status_code(), &err.body()).unwrap_or_else(|build_err| {
        error!("Failed to build error response: {}", build_err);
        let mut response = Response::new(String::new());
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}
