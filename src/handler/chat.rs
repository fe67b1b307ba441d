//! Chat request handler
//!
//! Gate → normalize → infer → shape. Every failure after the gate is caught
//! here and turned into either the policy-block shape or the generic 500 shape;
//! nothing reaches the connection layer as an error.

use crate::chat::{
    classify, ensure_system_message, ChatError, ChatPayload, FailureKind, SecurityGate, Verdict,
};
use crate::config::{ChatConfig, SecurityConfig};
use crate::http::{self, BodyError, ResponseBody};
use crate::inference::{InferenceBackend, InferenceRequest};
use crate::logger;
use http_body_util::{BodyExt, Limited};
use hyper::body::{Body, Bytes};
use hyper::{Request, Response};
use std::sync::Arc;

pub struct ChatHandler {
    chat: ChatConfig,
    gate: SecurityGate,
    policy_markers: Vec<String>,
    max_body_size: u64,
    backend: Arc<dyn InferenceBackend>,
}

impl ChatHandler {
    pub fn new(
        chat: ChatConfig,
        security: &SecurityConfig,
        max_body_size: u64,
        backend: Arc<dyn InferenceBackend>,
    ) -> Self {
        Self {
            chat,
            gate: SecurityGate::new(security),
            policy_markers: security.policy_markers.clone(),
            max_body_size,
            backend,
        }
    }

    /// Handle `POST` on the chat path
    pub async fn handle<B>(&self, req: Request<B>) -> Response<ResponseBody>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BodyError>,
    {
        // Decided from headers alone, before the body is touched
        let signal = self.gate.read_signal(req.headers());
        if let Verdict::Block { action } = self.gate.evaluate(&signal) {
            logger::log_chat_blocked(action.as_deref(), signal.threat_score);
            return http::build_policy_violation_response(action.as_deref());
        }

        match self.forward(req).await {
            Ok(response) => response,
            Err(err) => self.shape_failure(&err),
        }
    }

    async fn forward<B>(&self, req: Request<B>) -> Result<Response<ResponseBody>, ChatError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BodyError>,
    {
        let body = self.read_body(req.into_body()).await?;
        let mut payload: ChatPayload = serde_json::from_slice(&body)?;
        ensure_system_message(&mut payload.messages, &self.chat.system_prompt);

        let response = self
            .backend
            .run(InferenceRequest {
                model: self.chat.model.clone(),
                messages: payload.messages,
                max_tokens: self.chat.max_tokens,
                raw_response: true,
            })
            .await?;
        Ok(response)
    }

    async fn read_body<B>(&self, body: B) -> Result<Bytes, ChatError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<BodyError>,
    {
        let limit = usize::try_from(self.max_body_size).unwrap_or(usize::MAX);
        match Limited::new(body, limit).collect().await {
            Ok(collected) => Ok(collected.to_bytes()),
            Err(e) if e.is::<http_body_util::LengthLimitError>() => Err(ChatError::PayloadTooLarge {
                limit: self.max_body_size,
            }),
            Err(e) => Err(ChatError::BodyRead(e.to_string())),
        }
    }

    /// Log, then pick the client-facing shape
    fn shape_failure(&self, err: &ChatError) -> Response<ResponseBody> {
        let kind = classify(err, &self.policy_markers);
        logger::log_chat_failure(err, kind == FailureKind::PolicyRejection);

        match kind {
            FailureKind::PolicyRejection => http::build_policy_violation_response(None),
            FailureKind::Generic => http::build_generic_failure_response(),
        }
    }
}
