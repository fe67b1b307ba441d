//! Request routing dispatch module
//!
//! Entry point for HTTP request processing. Routing looks at the path and
//! method only; the body is left for whichever handler is chosen.

use crate::config::{AppState, ChatConfig};
use crate::handler::static_files::{self, AssetRequest};
use crate::http::{self, BodyError, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use hyper::body::{Body, Bytes};
use hyper::header::{IF_NONE_MATCH, USER_AGENT};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

/// Where a request goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Assets,
    Chat,
    MethodNotAllowed,
    NotFound,
}

/// Pick a route from method and path alone
pub fn resolve(method: &Method, path: &str, chat: &ChatConfig) -> Route {
    if path == "/" || !path.starts_with(&chat.api_prefix) {
        Route::Assets
    } else if path == chat.path {
        if method == Method::POST {
            Route::Chat
        } else {
            Route::MethodNotAllowed
        }
    } else {
        Route::NotFound
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BodyError>,
{
    let started = Instant::now();
    let access_log = state.cached_access_log.load(Ordering::Relaxed);
    let entry = access_log.then(|| access_entry(&req, peer_addr));

    let route = resolve(req.method(), req.uri().path(), &state.config.chat);
    let response = match route {
        Route::Assets => {
            // Owned copies so no borrow of the request is held across the await
            let path = req.uri().path().to_owned();
            let if_none_match = req
                .headers()
                .get(IF_NONE_MATCH)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string);
            let asset_req = AssetRequest {
                method: req.method().clone(),
                path: &path,
                if_none_match: if_none_match.as_deref(),
            };
            static_files::serve(&asset_req, &state.config.assets).await
        }
        Route::Chat => state.chat.handle(req).await,
        Route::MethodNotAllowed => {
            logger::log_warning(&format!(
                "Method not allowed: {} {}",
                req.method(),
                req.uri().path()
            ));
            http::build_405_response("POST")
        }
        Route::NotFound => http::build_404_response(),
    };

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

fn access_entry<B>(req: &Request<B>, peer_addr: SocketAddr) -> AccessLogEntry {
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    let version = req.version();
    entry.http_version = if version == Version::HTTP_10 {
        "1.0"
    } else if version == Version::HTTP_2 {
        "2"
    } else {
        "1.1"
    }
    .to_string();
    entry.user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);
    entry
}
