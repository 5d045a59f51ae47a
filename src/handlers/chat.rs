//! Chat gateway handler
//!
//! Orchestrates one request end to end: origin policy, method check,
//! secret check, body parse, the single provider call, and response
//! normalization. Every terminal state ends the request exactly once, and
//! every response carries the CORS headers decided for this origin.

use crate::error::{AppError, AppResult};
use crate::handlers::AppState;
use crate::middleware::RequestId;
use crate::providers::{CanonicalReply, ChatRequest};
use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, Method, StatusCode, header},
    response::{IntoResponse, Response},
};

use crate::cors::OriginDecision;

/// Gateway entry point for the chat endpoint
///
/// Registered for every method: `OPTIONS` preflights and method rejections
/// need the same CORS headers as real completions, so the method check
/// lives here rather than in the router.
///
/// The body arrives as a raw string; some hosting front ends deliver JSON
/// bodies unparsed, so parsing is the gateway's job and a parse failure is
/// a 400, not a transport error.
pub async fn handler(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> Response {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());
    let decision = state.policy().decide(origin);

    let response = match &decision {
        OriginDecision::Rejected { origin } => {
            tracing::info!(
                request_id = %request_id,
                origin = %origin,
                "Origin rejected by CORS policy"
            );
            AppError::CorsRejected {
                origin: origin.clone(),
            }
            .into_response()
        }
        OriginDecision::Allowed { .. } => {
            if method == Method::OPTIONS {
                // Preflight: origin decision plus an empty 204, never the provider
                StatusCode::NO_CONTENT.into_response()
            } else if method == Method::POST {
                complete(&state, &body, request_id)
                    .await
                    .unwrap_or_else(IntoResponse::into_response)
            } else {
                tracing::debug!(
                    request_id = %request_id,
                    method = %method,
                    "Method not allowed on chat endpoint"
                );
                AppError::MethodNotAllowed.into_response()
            }
        }
    };

    state.policy().stamp(response, &decision)
}

/// Run the provider leg of the request: secret check, normalization, the
/// single outbound call, and reply extraction
async fn complete(state: &AppState, body: &str, request_id: RequestId) -> AppResult<Response> {
    let adapter = state.adapter();

    // Fail fast before any network call rather than proceeding with an
    // empty credential
    let secret = state.secret().ok_or_else(|| AppError::MissingSecret {
        var: adapter.secret_env().to_string(),
    })?;

    let request: ChatRequest =
        serde_json::from_str(body).map_err(|e| AppError::BadRequest {
            details: e.to_string(),
        })?;

    let model = request
        .model
        .clone()
        .or_else(|| state.config().provider.model.clone())
        .unwrap_or_else(|| adapter.default_model().to_string());

    tracing::debug!(
        request_id = %request_id,
        provider = adapter.name(),
        model = %model,
        messages_count = request.messages.len(),
        "Forwarding chat request"
    );

    let provider_body = adapter.build_request(&request, &model);
    let raw = adapter
        .send(state.client(), &model, secret, &provider_body)
        .await?;

    if !raw.is_success() {
        tracing::warn!(
            request_id = %request_id,
            provider = adapter.name(),
            status = raw.status,
            "Provider returned an error; passing body through"
        );
        // Upstream error bodies are actionable diagnostics; forward them
        // unmodified under the provider's own status code
        let status =
            StatusCode::from_u16(raw.status).unwrap_or(StatusCode::BAD_GATEWAY);
        let envelope = serde_json::json!({
            "error": format!("{} API error", adapter.name()),
            "details": raw.body,
        });
        return Ok((status, Json(envelope)).into_response());
    }

    let content = adapter.extract_reply(&raw.body);

    tracing::info!(
        request_id = %request_id,
        provider = adapter.name(),
        model = %model,
        response_length = content.len(),
        "Chat completion successful"
    );

    let reply = CanonicalReply::new(content, raw.body);
    Ok((StatusCode::OK, Json(reply)).into_response())
}
