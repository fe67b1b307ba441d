//! Recording backend for handler and router tests.

use super::{InferenceBackend, InferenceError, InferenceRequest};
use crate::http::{BodyError, ResponseBody};
use async_trait::async_trait;
use http_body_util::{BodyExt, StreamBody};
use hyper::body::{Bytes, Frame};
use hyper::Response;
use std::sync::Mutex;

pub const MOCK_CONTENT_TYPE: &str = "text/event-stream";

/// Returns a fixed streamed body or a fixed error, and records every call.
pub struct MockBackend {
    outcome: Result<Vec<&'static str>, InferenceError>,
    calls: Mutex<Vec<InferenceRequest>>,
}

impl MockBackend {
    pub fn streaming(chunks: Vec<&'static str>) -> Self {
        Self {
            outcome: Ok(chunks),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: InferenceError) -> Self {
        Self {
            outcome: Err(error),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<InferenceRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn run(&self, request: InferenceRequest) -> Result<Response<ResponseBody>, InferenceError> {
        self.calls.lock().unwrap().push(request);

        let chunks = self.outcome.clone()?;
        let frames = futures::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, BodyError>(Frame::data(Bytes::from_static(c.as_bytes())))),
        );

        Ok(Response::builder()
            .status(200)
            .header("Content-Type", MOCK_CONTENT_TYPE)
            .body(StreamBody::new(frames).boxed_unsync())
            .unwrap())
    }
}
