/// Router Module Index
///
/// Routes are split by who may reach them. The dashboard pages sit behind the edge
/// gate and a layout guard; the API routers sit behind the data-layer role check in
/// their handlers' extractors.

/// Landing, sign-in, health, session, and the member profile.
pub mod public;

/// Server-rendered entry points of the three dashboard sections.
pub mod dashboards;

/// `/api/admin`: stored role must be admin.
pub mod admin;

/// `/api/artisan`: stored role must be artisan.
pub mod artisan;

/// `/api/client`: stored role must be client.
pub mod client;
