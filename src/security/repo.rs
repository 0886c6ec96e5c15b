use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::security::dto::{
    ComplianceScores, RiskLevels, SecurityRecord, ThreatCategories, TrendPoint,
    VulnerabilityCounts,
};

/// Stored form of a security record. `user_id` is a weak reference and is
/// deliberately not unique; lookups take the newest row for a user.
#[derive(Debug, FromRow)]
pub struct SecurityRecordRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub threat_categories: Json<ThreatCategories>,
    pub vulnerability_counts: Json<VulnerabilityCounts>,
    pub incident_trends: Json<Vec<TrendPoint>>,
    pub compliance_scores: Json<ComplianceScores>,
    pub risk_levels: Json<RiskLevels>,
    pub last_updated: OffsetDateTime,
}

const COLUMNS: &str = "id, user_id, threat_categories, vulnerability_counts, \
                       incident_trends, compliance_scores, risk_levels, last_updated";

impl SecurityRecordRow {
    pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Self>(&format!(
            "SELECT {COLUMNS} FROM security_records \
             WHERE user_id = $1 ORDER BY last_updated DESC LIMIT 1"
        ))
        .bind(user_id)
        .fetch_optional(db)
        .await
    }

    /// Create-if-absent-else-replace. Implemented as find-then-write rather
    /// than ON CONFLICT because user_id carries no unique constraint;
    /// concurrent writers for the same user race, last write wins.
    pub async fn upsert(
        db: &PgPool,
        user_id: Uuid,
        record: &SecurityRecord,
    ) -> sqlx::Result<Self> {
        match Self::find_by_user(db, user_id).await? {
            Some(existing) => {
                sqlx::query_as::<_, Self>(&format!(
                    "UPDATE security_records SET \
                         threat_categories = $2, vulnerability_counts = $3, \
                         incident_trends = $4, compliance_scores = $5, \
                         risk_levels = $6, last_updated = $7 \
                     WHERE id = $1 RETURNING {COLUMNS}"
                ))
                .bind(existing.id)
                .bind(Json(record.threat_categories.clone()))
                .bind(Json(record.vulnerability_counts.clone()))
                .bind(Json(record.incident_trends.clone()))
                .bind(Json(record.compliance_scores.clone()))
                .bind(Json(record.risk_levels.clone()))
                .bind(record.last_updated)
                .fetch_one(db)
                .await
            }
            None => {
                sqlx::query_as::<_, Self>(&format!(
                    "INSERT INTO security_records \
                         (user_id, threat_categories, vulnerability_counts, \
                          incident_trends, compliance_scores, risk_levels, last_updated) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {COLUMNS}"
                ))
                .bind(user_id)
                .bind(Json(record.threat_categories.clone()))
                .bind(Json(record.vulnerability_counts.clone()))
                .bind(Json(record.incident_trends.clone()))
                .bind(Json(record.compliance_scores.clone()))
                .bind(Json(record.risk_levels.clone()))
                .bind(record.last_updated)
                .fetch_one(db)
                .await
            }
        }
    }

    pub fn into_record(self) -> SecurityRecord {
        SecurityRecord {
            threat_categories: self.threat_categories.0,
            vulnerability_counts: self.vulnerability_counts.0,
            incident_trends: self.incident_trends.0,
            compliance_scores: self.compliance_scores.0,
            risk_levels: self.risk_levels.0,
            last_updated: self.last_updated,
        }
    }
}
