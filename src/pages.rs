//! Server-rendered page shells. The marketing site and dashboard UI are served by
//! the frontend; these handlers only exist so every section has a guarded entry
//! point that renders once the layout guard lets the request through.

use axum::{http::Uri, response::Html};

use crate::{
    access::SIGN_IN_PATH,
    guards::{Area, LayoutGuard},
};

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn shell(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{} | ArtisanLink</title></head><body>{}</body></html>",
        escape_html(title),
        body
    ))
}

pub async fn landing() -> Html<String> {
    shell(
        "Find trusted artisans in Kenya",
        &format!(
            "<main><h1>ArtisanLink</h1><p>Connecting clients with skilled artisans.</p><a href=\"{SIGN_IN_PATH}\">Sign in</a></main>"
        ),
    )
}

pub async fn sign_in() -> Html<String> {
    shell(
        "Sign in",
        "<main><h1>Sign in</h1><div id=\"sign-in\"></div></main>",
    )
}

/// dashboard
///
/// Entry point of a dashboard section, for the root and every nested path.
/// The `LayoutGuard` has already redirected anyone who does not belong here.
pub async fn dashboard<A: Area>(guard: LayoutGuard<A>, uri: Uri) -> Html<String> {
    let role = A::ROLE;
    let user = guard.identity.user_id.as_deref().unwrap_or_default();

    shell(
        &format!("{role} dashboard"),
        &format!(
            "<main data-section=\"{role}\" data-path=\"{}\"><h1>{role} dashboard</h1><p>Signed in as {}</p></main>",
            escape_html(uri.path()),
            escape_html(user)
        ),
    )
}
