use axum::{
    extract::{FromRequestParts, Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    access::{self, SessionIdentity, Verdict},
};

/// edge_gate
///
/// Request interceptor layered over the whole router. Paths outside the dashboard
/// prefixes pass straight through without touching the identity provider. Inside a
/// prefix the session is resolved and the shared decision either lets the request
/// continue or answers with a 307 to the verdict's target.
///
/// A failing identity provider fails the request (500); there is no retry.
pub async fn edge_gate(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(required) = access::protected_role(request.uri().path()) else {
        return next.run(request).await;
    };

    let (mut parts, body) = request.into_parts();
    let identity = match SessionIdentity::from_request_parts(&mut parts, &state).await {
        Ok(identity) => identity,
        Err(e) => return e.into_response(),
    };

    match access::decide(&identity, required) {
        Verdict::Proceed => next.run(Request::from_parts(parts, body)).await,
        Verdict::Redirect { target, reason } => {
            tracing::info!(path = %parts.uri.path(), target, ?reason, "edge gate redirect");
            Redirect::temporary(target).into_response()
        }
    }
}
