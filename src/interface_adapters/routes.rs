use crate::interface_adapters::handlers::{
    collection, draw, get_species, list_species, populate_tank, quota_status, resize_tank,
    tank_snapshot,
};
use crate::interface_adapters::net::tank_ws_handler;
use crate::interface_adapters::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/species", get(list_species))
        .route("/species/{species_id}", get(get_species))
        .route("/players/{user_id}/quota", get(quota_status))
        .route("/players/{user_id}/draw", post(draw))
        .route("/players/{user_id}/collection", get(collection))
        .route("/tank", get(tank_snapshot))
        .route("/tank/resize", post(resize_tank))
        .route("/tank/populate", post(populate_tank))
        .route("/tank/ws", get(tank_ws_handler))
        .with_state(state)
}
