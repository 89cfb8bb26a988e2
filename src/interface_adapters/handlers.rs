use crate::domain::errors::DrawError;
use crate::domain::tank::TankBounds;
use crate::interface_adapters::protocol::{
    CollectionResponse, DrawResponse, ErrorResponse, PopulateRequest, QuotaResponse, ResizeRequest,
    SpeciesDto, TankUpdateDto,
};
use crate::interface_adapters::state::{AppState, SystemClock};
use crate::use_cases::{
    CollectionUseCase, DrawUseCase, QuotaStatusUseCase, TankCommandError,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::{error, warn};

// Longest user id accepted on player routes.
const MAX_USER_ID_LEN: usize = 64;

// Handler listing the whole species catalog.
pub async fn list_species(State(state): State<AppState>) -> Json<Vec<SpeciesDto>> {
    Json(state.engine.catalog().all().iter().map(SpeciesDto::from).collect())
}

// Handler for a single species definition.
pub async fn get_species(
    State(state): State<AppState>,
    Path(species_id): Path<String>,
) -> Result<Json<SpeciesDto>, (StatusCode, Json<ErrorResponse>)> {
    state
        .engine
        .catalog()
        .get(&species_id)
        .map(|species| Json(SpeciesDto::from(species)))
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, "unknown species"))
}

// Handler for a read-only quota lookup.
pub async fn quota_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<QuotaResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user_id = validate_user_id(&user_id)?;
    let use_case = QuotaStatusUseCase {
        clock: SystemClock,
        store: state.store.clone(),
        quota: state.quota,
    };

    let quota = use_case.execute(user_id).await.map_err(map_draw_error)?;

    Ok(Json(QuotaResponse::from(quota)))
}

// Handler for one reward draw.
pub async fn draw(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DrawResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user_id = validate_user_id(&user_id)?;
    let use_case = DrawUseCase {
        clock: SystemClock,
        store: state.store.clone(),
        random: state.random.clone(),
        engine: state.engine.clone(),
        quota: state.quota,
    };

    let result = use_case.execute(user_id).await.map_err(map_draw_error)?;

    Ok(Json(DrawResponse::from(result)))
}

// Handler for a user's collection and score.
pub async fn collection(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<CollectionResponse>, (StatusCode, Json<ErrorResponse>)> {
    let user_id = validate_user_id(&user_id)?;
    let use_case = CollectionUseCase {
        store: state.store.clone(),
    };

    let view = use_case.execute(user_id).await.map_err(map_draw_error)?;

    Ok(Json(CollectionResponse::from(view)))
}

// Handler returning the latest tank snapshot.
pub async fn tank_snapshot(
    State(state): State<AppState>,
) -> Result<Json<TankUpdateDto>, (StatusCode, Json<ErrorResponse>)> {
    state
        .tank
        .latest()
        .map(|update| Json(TankUpdateDto::from(&update)))
        .ok_or_else(|| error_response(StatusCode::SERVICE_UNAVAILABLE, "tank not ready"))
}

// Handler queueing a tank resize for the next tick.
pub async fn resize_tank(
    State(state): State<AppState>,
    Json(payload): Json<ResizeRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let valid_extent = |v: f32| v.is_finite() && v > 0.0;
    let valid_depth = payload.depth.is_none_or(|d| d.is_finite() && d >= 0.0);
    if !valid_extent(payload.width) || !valid_extent(payload.height) || !valid_depth {
        return Err(error_response(StatusCode::BAD_REQUEST, "invalid tank size"));
    }

    let bounds = TankBounds::from_extent(payload.width, payload.height, payload.depth);
    state.tank.resize(bounds).map_err(map_tank_error)?;

    Ok(StatusCode::ACCEPTED)
}

// Handler restocking the tank from a collection or the default sample.
pub async fn populate_tank(
    State(state): State<AppState>,
    payload: Option<Json<PopulateRequest>>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let Json(payload) = payload.unwrap_or_default();

    let species_ids = match payload.user_id.as_deref() {
        Some(user_id) => {
            let user_id = validate_user_id(user_id)?;
            let use_case = CollectionUseCase {
                store: state.store.clone(),
            };
            use_case
                .execute(user_id)
                .await
                .map_err(map_draw_error)?
                .species_ids()
        }
        None => Vec::new(),
    };

    state.tank.populate(species_ids).map_err(map_tank_error)?;

    Ok(StatusCode::ACCEPTED)
}

fn validate_user_id(value: &str) -> Result<&str, (StatusCode, Json<ErrorResponse>)> {
    if value.trim().is_empty() || value.chars().count() > MAX_USER_ID_LEN {
        return Err(error_response(StatusCode::BAD_REQUEST, "invalid user_id"));
    }
    Ok(value)
}

// Helper to build a JSON error response.
fn error_response(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            message: message.to_string(),
            next_reset_at: None,
        }),
    )
}

// Maps draw workflow errors to HTTP responses.
pub fn map_draw_error(err: DrawError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        DrawError::QuotaExhausted { next_reset_at } => (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse {
                message: "draw quota exhausted".to_string(),
                next_reset_at: Some(next_reset_at),
            }),
        ),
        DrawError::DrawInProgress => {
            error_response(StatusCode::CONFLICT, "draw already in progress")
        }
        DrawError::EmptyTier { .. } | DrawError::CatalogMisconfigured(_) => {
            error!(error = %err, "reward catalog misconfigured");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "reward service unavailable")
        }
        DrawError::StorageFailure(reason) => {
            warn!(error = %reason, "player store failed");
            error_response(StatusCode::BAD_GATEWAY, "storage error")
        }
    }
}

fn map_tank_error(err: TankCommandError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        TankCommandError::Busy => error_response(StatusCode::SERVICE_UNAVAILABLE, "tank busy"),
        TankCommandError::Stopped => {
            error!("tank task is not running");
            error_response(StatusCode::SERVICE_UNAVAILABLE, "tank unavailable")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::Rarity;

    #[test]
    fn when_quota_is_exhausted_then_maps_to_429_with_reset_time() {
        let (status, Json(body)) = map_draw_error(DrawError::QuotaExhausted { next_reset_at: 42 });

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body.next_reset_at, Some(42));
    }

    #[test]
    fn when_tier_is_empty_then_maps_to_generic_500() {
        let (status, Json(body)) = map_draw_error(DrawError::EmptyTier {
            tier: Rarity::Mythical,
        });

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body.message.contains("mythical"));
    }

    #[test]
    fn when_user_id_is_too_long_then_it_is_rejected() {
        let long = "x".repeat(MAX_USER_ID_LEN + 1);

        assert!(validate_user_id(&long).is_err());
        assert!(validate_user_id("   ").is_err());
        assert_eq!(validate_user_id("reef-7").ok(), Some("reef-7"));
    }
}
