use axum::Router;

pub mod accounts;
pub mod statements;
pub mod system;

/// Router for all tenant-scoped endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/accounts", accounts::router())
        .nest("/statements", statements::router())
}
