//! Transaction helpers used by every domain that writes to the logs

use chrono::Utc;
use relocrm_common::Result;
use serde_json::Value;
use sqlx::{Postgres, Transaction};
use uuid::Uuid;

use super::activity_logs::ACTIVITY_COLUMNS;
use super::audit_logs::AUDIT_COLUMNS;
use crate::domain::diff::diff_snapshots;
use crate::domain::entities::{
    ActivityLog, AuditAction, AuditLogEntry, NewActivity, NewAuditEntry,
};

/// Append an activity row within an existing transaction.
pub async fn record_activity_tx(
    tx: &mut Transaction<'_, Postgres>,
    activity: NewActivity,
) -> Result<ActivityLog> {
    let query = format!(
        "INSERT INTO activity_logs ({ACTIVITY_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING {ACTIVITY_COLUMNS}"
    );
    let created = sqlx::query_as::<_, ActivityLog>(&query)
        .bind(Uuid::new_v4())
        .bind(activity.entity_type)
        .bind(activity.entity_id)
        .bind(activity.applicant_id)
        .bind(&activity.action)
        .bind(&activity.description)
        .bind(activity.user_id)
        .bind(&activity.user_name)
        .bind(&activity.metadata)
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await?;

    tracing::debug!(
        entity_type = %created.entity_type,
        entity_id = %created.entity_id,
        action = %created.action,
        "Activity recorded"
    );
    Ok(created)
}

/// Stored shape of an audit entry after diffing
#[derive(Debug, PartialEq)]
pub(crate) struct AuditValues {
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub changed_fields: Vec<String>,
}

/// Reduce snapshots to what gets stored. `None` means there is nothing to record.
pub(crate) fn audit_values(entry: &NewAuditEntry) -> Option<AuditValues> {
    match (entry.action, &entry.before, &entry.after) {
        (AuditAction::Created, _, Some(after)) => Some(AuditValues {
            old_values: None,
            changed_fields: top_level_keys(after),
            new_values: Some(after.clone()),
        }),
        (AuditAction::Deleted, Some(before), _) => Some(AuditValues {
            changed_fields: top_level_keys(before),
            old_values: Some(before.clone()),
            new_values: None,
        }),
        (action, Some(before), Some(after)) => {
            let diff = diff_snapshots(before, after);
            if diff.is_empty() && action == AuditAction::Updated {
                return None;
            }
            Some(AuditValues {
                old_values: Some(Value::Object(diff.old_values)),
                new_values: Some(Value::Object(diff.new_values)),
                changed_fields: diff.changed_fields,
            })
        }
        _ => None,
    }
}

fn top_level_keys(value: &Value) -> Vec<String> {
    let mut keys: Vec<String> = value
        .as_object()
        .map(|m| m.keys().cloned().collect())
        .unwrap_or_default();
    keys.sort();
    keys
}

/// Append an audit row within an existing transaction.
///
/// Returns `None` when an update changed nothing.
pub async fn record_audit_tx(
    tx: &mut Transaction<'_, Postgres>,
    entry: NewAuditEntry,
) -> Result<Option<AuditLogEntry>> {
    let Some(values) = audit_values(&entry) else {
        tracing::debug!(
            entity_type = %entry.entity_type,
            entity_id = %entry.entity_id,
            "Audit entry skipped, no fields changed"
        );
        return Ok(None);
    };

    let query = format!(
        "INSERT INTO audit_logs ({AUDIT_COLUMNS}) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {AUDIT_COLUMNS}"
    );
    let created = sqlx::query_as::<_, AuditLogEntry>(&query)
        .bind(Uuid::new_v4())
        .bind(entry.entity_type)
        .bind(entry.entity_id)
        .bind(entry.action)
        .bind(values.old_values)
        .bind(values.new_values)
        .bind(&values.changed_fields)
        .bind(entry.user_id)
        .bind(Utc::now())
        .fetch_one(&mut **tx)
        .await?;

    Ok(Some(created))
}
