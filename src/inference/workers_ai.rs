//! Workers AI REST client
//!
//! Calls `POST {api_base}/accounts/{account}/ai/run/{model}`, or the AI Gateway
//! equivalent when a gateway is configured, and hands the upstream response back
//! without reading it so bytes reach the client as they arrive.

use super::{InferenceBackend, InferenceError, InferenceRequest};
use crate::chat::ChatMessage;
use crate::config::InferenceConfig;
use crate::http::{self, BodyError, ResponseBody};
use crate::logger;
use async_trait::async_trait;
use futures::TryStreamExt;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::Frame;
use hyper::header::{HeaderName, CONNECTION, CONTENT_LENGTH, TRANSFER_ENCODING};
use hyper::Response;
use serde::Serialize;
use std::time::Duration;

const SKIP_CACHE_HEADER: &str = "cf-aig-skip-cache";
const CACHE_TTL_HEADER: &str = "cf-aig-cache-ttl";

#[derive(Debug, Serialize)]
struct RunPayload<'a> {
    messages: &'a [ChatMessage],
    max_tokens: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

/// HTTP implementation of [`InferenceBackend`]
pub struct WorkersAiClient {
    client: reqwest::Client,
    config: InferenceConfig,
}

impl WorkersAiClient {
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| InferenceError::NotConfigured(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// URL for running `model`, through the gateway when one is set
    pub fn endpoint(&self, model: &str) -> String {
        match &self.config.gateway {
            Some(gateway) => format!(
                "{}/{}/{}/workers-ai/{model}",
                self.config.gateway_base.trim_end_matches('/'),
                self.config.account_id,
                gateway.id,
            ),
            None => format!(
                "{}/accounts/{}/ai/run/{model}",
                self.config.api_base.trim_end_matches('/'),
                self.config.account_id,
            ),
        }
    }

    fn check_configured(&self) -> Result<(), InferenceError> {
        if self.config.account_id.is_empty() {
            return Err(InferenceError::NotConfigured("missing account_id".to_string()));
        }
        if self.config.api_token.is_empty() {
            return Err(InferenceError::NotConfigured("missing api_token".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl InferenceBackend for WorkersAiClient {
    async fn run(&self, request: InferenceRequest) -> Result<Response<ResponseBody>, InferenceError> {
        self.check_configured()?;

        let payload = RunPayload {
            messages: &request.messages,
            max_tokens: request.max_tokens,
            stream: request.raw_response && self.config.stream,
        };

        let mut call = self
            .client
            .post(self.endpoint(&request.model))
            .bearer_auth(&self.config.api_token)
            .json(&payload);
        if let Some(gateway) = &self.config.gateway {
            if gateway.skip_cache {
                call = call.header(SKIP_CACHE_HEADER, "true");
            }
            if let Some(ttl) = gateway.cache_ttl {
                call = call.header(CACHE_TTL_HEADER, ttl.to_string());
            }
        }

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            max_tokens = request.max_tokens,
            stream = payload.stream,
            "invoking inference"
        );

        let upstream = call
            .send()
            .await
            .map_err(network_error)?;

        let status = upstream.status();
        if !status.is_success() {
            let message = match upstream.text().await {
                Ok(text) => text,
                Err(e) => {
                    logger::log_warning(&format!(
                        "Failed to read inference error body (status {status}): {}",
                        e.without_url()
                    ));
                    String::new()
                }
            };
            return Err(InferenceError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        into_passthrough(upstream, request.raw_response).await
    }
}

/// Transport failure without the request URL, whose model and gateway ids
/// must not reach policy-marker matching
fn network_error(e: reqwest::Error) -> InferenceError {
    InferenceError::Network(e.without_url().to_string())
}

/// Headers that describe the upstream connection rather than the payload
fn is_hop_by_hop(name: &HeaderName) -> bool {
    *name == CONNECTION
        || *name == TRANSFER_ENCODING
        || *name == CONTENT_LENGTH
        || name.as_str() == "keep-alive"
}

/// Re-wrap the upstream response for the client: same status, same headers
/// (content-type included), body streamed frame by frame or buffered when a
/// raw response was not asked for.
async fn into_passthrough(
    upstream: reqwest::Response,
    raw: bool,
) -> Result<Response<ResponseBody>, InferenceError> {
    let mut builder = Response::builder().status(upstream.status());
    for (name, value) in upstream.headers() {
        if !is_hop_by_hop(name) {
            builder = builder.header(name, value);
        }
    }

    let body = if raw {
        let frames = upstream
            .bytes_stream()
            .map_ok(Frame::data)
            .map_err(|e| Box::new(e.without_url()) as BodyError);
        StreamBody::new(frames).boxed_unsync()
    } else {
        let bytes = upstream
            .bytes()
            .await
            .map_err(network_error)?;
        http::full(bytes)
    };

    builder
        .body(body)
        .map_err(|e| InferenceError::Upstream {
            status: 502,
            message: format!("unusable upstream response: {e}"),
        })
}
