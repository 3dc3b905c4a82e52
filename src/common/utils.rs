use lambda_http::http::response::Builder;
use lambda_http::http::StatusCode;
use lambda_http::{Request, RequestPayloadExt, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::common::errors::Error;

const EMPTY_PAYLOAD_ERROR: &str = "Request payload is empty";

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Response builder carrying the CORS headers every response needs.
pub fn response_builder(status: StatusCode) -> Builder {
    Response::builder()
        .status(status)
        .header("Access-Control-Allow-Origin", ALLOW_ORIGIN)
        .header("Access-Control-Allow-Methods", ALLOW_METHODS)
        .header("Access-Control-Allow-Headers", ALLOW_HEADERS)
}

pub fn empty_response(status: StatusCode) -> Result<Response<String>, Error> {
    let response = response_builder(status).body(String::new())?;

    Ok(response)
}

pub fn json_response<T: Serialize>(
    status: StatusCode,
    body: &T,
) -> Result<Response<String>, Error> {
    let response = response_builder(status)
        .header("Content-Type", "application/json")
        .body(serde_json::to_string(body)?)?;

    Ok(response)
}

/// Deserializes the JSON body. A body sent without a `Content-Type` header is
/// still read as JSON.
pub fn extract_request<T: DeserializeOwned>(request: &Request) -> Result<T, Error> {
    match request.payload::<T>() {
        Ok(Some(val)) => Ok(val),
        Ok(None) => {
            let body: &[u8] = request.body();
            if body.is_empty() {
                return Err(Error::InvalidRequest(EMPTY_PAYLOAD_ERROR.into()));
            }

            serde_json::from_slice(body).map_err(|err| Error::InvalidRequest(err.to_string()))
        }
        Err(err) => Err(Error::InvalidRequest(err.to_string())),
    }
}
