use crate::{
    AppState,
    guards::{AdminArea, Area, ArtisanArea, ClientArea},
    pages,
};
use axum::{Router, routing::get};

fn section<A: Area>(router: Router<AppState>) -> Router<AppState> {
    let home = A::ROLE.home();
    router
        .route(home, get(pages::dashboard::<A>))
        .route(&format!("{home}/{{*rest}}"), get(pages::dashboard::<A>))
}

/// Dashboard Router Module
///
/// One root and one catch-all route per section, each rendered through
/// `LayoutGuard<A>` for the section's role. The edge gate layered over the
/// whole application has normally redirected mismatches before these run.
pub fn dashboard_routes() -> Router<AppState> {
    let router = Router::new();
    let router = section::<AdminArea>(router);
    let router = section::<ArtisanArea>(router);
    section::<ClientArea>(router)
}
