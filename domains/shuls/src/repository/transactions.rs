//! Transactional free functions for the Shuls domain

use relocrm_common::Result;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::shuls::SHUL_COLUMNS;
use crate::domain::distance::PropertyShulDistance;
use crate::domain::entities::Shul;

pub async fn find_shul_for_update_tx(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Shul>> {
    let query = format!("SELECT {SHUL_COLUMNS} FROM shuls WHERE id = $1 FOR UPDATE");
    let shul = sqlx::query_as::<_, Shul>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

    Ok(shul)
}

pub async fn insert_shul_tx(tx: &mut Transaction<'_, Postgres>, shul: &Shul) -> Result<Shul> {
    let query = format!(
        "INSERT INTO shuls ({SHUL_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {SHUL_COLUMNS}"
    );
    let created = sqlx::query_as::<_, Shul>(&query)
        .bind(shul.id)
        .bind(&shul.name)
        .bind(&shul.address)
        .bind(&shul.denomination)
        .bind(&shul.rabbi)
        .bind(&shul.phone)
        .bind(&shul.website)
        .bind(shul.is_active)
        .bind(shul.created_at)
        .bind(shul.updated_at)
        .fetch_one(&mut **tx)
        .await?;

    Ok(created)
}

pub async fn update_shul_tx(tx: &mut Transaction<'_, Postgres>, shul: &Shul) -> Result<Shul> {
    let query = format!(
        "UPDATE shuls SET \
            name = $2, address = $3, denomination = $4, rabbi = $5, phone = $6, \
            website = $7, is_active = $8, updated_at = $9 \
         WHERE id = $1 \
         RETURNING {SHUL_COLUMNS}"
    );
    let updated = sqlx::query_as::<_, Shul>(&query)
        .bind(shul.id)
        .bind(&shul.name)
        .bind(&shul.address)
        .bind(&shul.denomination)
        .bind(&shul.rabbi)
        .bind(&shul.phone)
        .bind(&shul.website)
        .bind(shul.is_active)
        .bind(shul.updated_at)
        .fetch_one(&mut **tx)
        .await?;

    Ok(updated)
}

/// Drop cached distances to a shul after it moves
pub async fn clear_shul_distances_tx(
    tx: &mut Transaction<'_, Postgres>,
    shul_id: Uuid,
) -> Result<u64> {
    let result = sqlx::query("DELETE FROM property_shul_distances WHERE shul_id = $1")
        .bind(shul_id)
        .execute(&mut **tx)
        .await?;

    Ok(result.rows_affected())
}

/// Insert or refresh distance rows in one statement
pub async fn upsert_distances_tx(
    tx: &mut Transaction<'_, Postgres>,
    distances: &[PropertyShulDistance],
) -> Result<()> {
    if distances.is_empty() {
        return Ok(());
    }
    let property_ids: Vec<Uuid> = distances.iter().map(|d| d.property_id).collect();
    let shul_ids: Vec<Uuid> = distances.iter().map(|d| d.shul_id).collect();
    let miles: Vec<f64> = distances.iter().map(|d| d.distance_miles).collect();
    let minutes: Vec<i32> = distances.iter().map(|d| d.walking_minutes).collect();
    let calculated: Vec<_> = distances.iter().map(|d| d.calculated_at).collect();

    sqlx::query(
        "INSERT INTO property_shul_distances \
            (property_id, shul_id, distance_miles, walking_minutes, calculated_at) \
         SELECT * FROM UNNEST($1::uuid[], $2::uuid[], $3::float8[], $4::int[], $5::timestamptz[]) \
         ON CONFLICT (property_id, shul_id) DO UPDATE SET \
            distance_miles = EXCLUDED.distance_miles, \
            walking_minutes = EXCLUDED.walking_minutes, \
            calculated_at = EXCLUDED.calculated_at",
    )
    .bind(&property_ids)
    .bind(&shul_ids)
    .bind(&miles)
    .bind(&minutes)
    .bind(&calculated)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
