use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::ip_extraction::client_ip;
use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use zipdrop_services::{RateDecision, RateScope};

fn set_header(response: &mut Response, name: &'static str, value: impl ToString) {
    if let Ok(header_value) = HeaderValue::from_str(&value.to_string()) {
        response.headers_mut().insert(name, header_value);
    }
}

fn set_limit_headers(response: &mut Response, decision: &RateDecision) {
    set_header(response, "X-RateLimit-Limit", decision.limit);
    set_header(response, "X-RateLimit-Remaining", decision.remaining);
}

/// General-traffic rate limit, keyed by client IP.
///
/// Adds `X-RateLimit-Limit` and `X-RateLimit-Remaining` to every response, and
/// `Retry-After` on 429. A counter-store outage follows the general scope's
/// fail-open setting.
pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let identity = client_ip(request.headers(), peer, state.trusted_proxy_count)
        .map(|ip| format!("ip:{}", ip))
        .unwrap_or_else(|| "ip:unknown".to_string());

    let decision = match state
        .service
        .limiter()
        .allow(RateScope::General, &identity)
        .await
    {
        Ok(decision) => decision,
        Err(e) => return HttpAppError(e).into_response(),
    };

    match decision.into_result(RateScope::General) {
        Ok(decision) => {
            let mut response = next.run(request).await;
            set_limit_headers(&mut response, &decision);
            response
        }
        Err(e) => {
            tracing::info!(
                identity = %identity,
                path = %request.uri().path(),
                "General rate limit exceeded"
            );
            let mut response = HttpAppError(e).into_response();
            set_limit_headers(&mut response, &decision);
            response
        }
    }
}
