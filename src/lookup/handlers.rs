use axum::{extract::Path, routing::get, Json, Router};
use tracing::debug;

use super::data;
use crate::state::AppState;

pub fn lookup_routes() -> Router<AppState> {
    Router::new()
        .route("/countries", get(list_countries))
        .route("/states/:country", get(list_states))
        .route("/cities/:state", get(list_cities))
}

pub async fn list_countries() -> Json<&'static [&'static str]> {
    Json(data::countries())
}

pub async fn list_states(Path(country): Path<String>) -> Json<&'static [&'static str]> {
    let states = data::states(&country);
    debug!(%country, count = states.len(), "states lookup");
    Json(states)
}

pub async fn list_cities(Path(state): Path<String>) -> Json<&'static [&'static str]> {
    let cities = data::cities(&state);
    debug!(%state, count = cities.len(), "cities lookup");
    Json(cities)
}
