mod access;
mod overrides;

use axum::Router;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().nest("/access", access::routes().merge(overrides::routes()))
}
