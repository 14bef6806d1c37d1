//! Property-to-shul distance handlers

use std::collections::HashMap;

use axum::{extract::State, Json};
use relocrm_common::{Error, Path, Result};
use uuid::Uuid;

use crate::api::middleware::{AuthUser, ShulsState};
use crate::domain::distance::{resolve_distances, ShulDistance};
use crate::repository::upsert_distances_tx;

/// Distances to every active geocoded shul. With `recalculate` the cache is
/// ignored and every pair is recomputed.
async fn load_distances(
    state: &ShulsState,
    property_id: Uuid,
    recalculate: bool,
) -> Result<Vec<ShulDistance>> {
    let address = state
        .repos
        .distances
        .find_property_address(property_id)
        .await?
        .ok_or_else(|| Error::not_found("Property", property_id))?;
    let property_at = address.coordinates().ok_or_else(|| {
        Error::validation("Property has no coordinates; shul distances cannot be calculated")
    })?;

    let shuls = state.repos.shuls.list_active_geocoded().await?;
    let cached = if recalculate {
        HashMap::new()
    } else {
        state
            .repos
            .distances
            .list_for_property(property_id)
            .await?
            .into_iter()
            .map(|d| (d.shul_id, d))
            .collect()
    };

    let (distances, calculated) = resolve_distances(property_id, property_at, &shuls, &cached);
    if !calculated.is_empty() {
        let mut tx = state.repos.begin().await?;
        upsert_distances_tx(&mut tx, &calculated).await?;
        tx.commit().await?;
        tracing::debug!(
            property_id = %property_id,
            calculated = calculated.len(),
            "Stored shul distances"
        );
    }
    Ok(distances)
}

/// **GET /api/properties/{id}/shul-distances**
pub async fn get_distances(
    AuthUser(_ctx): AuthUser,
    State(state): State<ShulsState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<Vec<ShulDistance>>> {
    Ok(Json(load_distances(&state, property_id, false).await?))
}

/// **POST /api/properties/{id}/shul-distances/recalculate**
pub async fn recalculate_distances(
    AuthUser(ctx): AuthUser,
    State(state): State<ShulsState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<Vec<ShulDistance>>> {
    let distances = load_distances(&state, property_id, true).await?;
    tracing::info!(
        property_id = %property_id,
        shuls = distances.len(),
        user_id = %ctx.user_id(),
        "Shul distances recalculated"
    );
    Ok(Json(distances))
}
