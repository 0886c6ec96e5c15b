use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ApiError;

/// Per-user document of synthetic security metrics. Serialized camelCase,
/// exactly the shape the dashboard frontend consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRecord {
    pub threat_categories: ThreatCategories,
    pub vulnerability_counts: VulnerabilityCounts,
    pub incident_trends: Vec<TrendPoint>,
    pub compliance_scores: ComplianceScores,
    pub risk_levels: RiskLevels,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThreatCategories {
    pub malware: u32,
    pub phishing: u32,
    pub ddos: u32,
    pub insider: u32,
    pub social: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VulnerabilityCounts {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub count: u32,
}

/// Percentages, 0-100.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComplianceScores {
    pub overall: u32,
    pub network: u32,
    pub application: u32,
    pub data: u32,
    pub physical: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskLevels {
    pub critical: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

#[derive(Debug, Serialize)]
pub struct TrendsResponse {
    pub trends: Vec<TrendPoint>,
}

/// Partial update body for `PUT /api/security/update`. Sections are
/// replace-wholesale: a present section overwrites the stored one, an absent
/// section is left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDashboardRequest {
    pub threat_categories: Option<ThreatCategories>,
    pub vulnerability_counts: Option<VulnerabilityCounts>,
    pub incident_trends: Option<Vec<TrendPoint>>,
    pub compliance_scores: Option<ComplianceScores>,
    pub risk_levels: Option<RiskLevels>,
}

impl SecurityRecord {
    /// Zero-valued record used as the merge base when a user has no stored
    /// record yet.
    pub fn empty(now: OffsetDateTime) -> Self {
        Self {
            threat_categories: ThreatCategories::default(),
            vulnerability_counts: VulnerabilityCounts::default(),
            incident_trends: Vec::new(),
            compliance_scores: ComplianceScores::default(),
            risk_levels: RiskLevels::default(),
            last_updated: now,
        }
    }
}

impl UpdateDashboardRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(scores) = &self.compliance_scores {
            for (name, value) in [
                ("overall", scores.overall),
                ("network", scores.network),
                ("application", scores.application),
                ("data", scores.data),
                ("physical", scores.physical),
            ] {
                if value > 100 {
                    return Err(ApiError::Validation(format!(
                        "complianceScores.{name} must be between 0 and 100"
                    )));
                }
            }
        }
        if let Some(trends) = &self.incident_trends {
            if trends.windows(2).any(|pair| pair[0].date >= pair[1].date) {
                return Err(ApiError::Validation(
                    "incidentTrends dates must be strictly ascending".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn apply(self, record: &mut SecurityRecord) {
        if let Some(threats) = self.threat_categories {
            record.threat_categories = threats;
        }
        if let Some(vulns) = self.vulnerability_counts {
            record.vulnerability_counts = vulns;
        }
        if let Some(trends) = self.incident_trends {
            record.incident_trends = trends;
        }
        if let Some(scores) = self.compliance_scores {
            record.compliance_scores = scores;
        }
        if let Some(risks) = self.risk_levels {
            record.risk_levels = risks;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn sample_record(now: OffsetDateTime) -> SecurityRecord {
        let mut record = SecurityRecord::empty(now);
        record.threat_categories.malware = 20;
        record.compliance_scores.overall = 90;
        record.incident_trends = vec![
            TrendPoint {
                date: now - Duration::days(1),
                count: 12,
            },
            TrendPoint {
                date: now,
                count: 9,
            },
        ];
        record
    }

    #[test]
    fn record_serializes_with_dashboard_keys_only() {
        let record = sample_record(OffsetDateTime::now_utc());
        let value = serde_json::to_value(&record).expect("serialize");
        let mut keys: Vec<&str> = value
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec![
                "complianceScores",
                "incidentTrends",
                "lastUpdated",
                "riskLevels",
                "threatCategories",
                "vulnerabilityCounts",
            ]
        );
    }

    #[test]
    fn last_updated_serializes_as_rfc3339() {
        let record = sample_record(OffsetDateTime::now_utc());
        let value = serde_json::to_value(&record).expect("serialize");
        let ts = value["lastUpdated"].as_str().expect("string timestamp");
        assert!(ts.contains('T'));
    }

    #[test]
    fn update_rejects_out_of_range_compliance() {
        let body = UpdateDashboardRequest {
            compliance_scores: Some(ComplianceScores {
                overall: 101,
                ..ComplianceScores::default()
            }),
            ..UpdateDashboardRequest::default()
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn update_rejects_unordered_trend_dates() {
        let now = OffsetDateTime::now_utc();
        let body = UpdateDashboardRequest {
            incident_trends: Some(vec![
                TrendPoint { date: now, count: 3 },
                TrendPoint {
                    date: now - Duration::days(1),
                    count: 4,
                },
            ]),
            ..UpdateDashboardRequest::default()
        };
        assert!(body.validate().is_err());
    }

    #[test]
    fn update_accepts_a_well_formed_partial_body() {
        let now = OffsetDateTime::now_utc();
        let body = UpdateDashboardRequest {
            compliance_scores: Some(ComplianceScores {
                overall: 100,
                network: 80,
                application: 75,
                data: 85,
                physical: 70,
            }),
            incident_trends: Some(vec![
                TrendPoint {
                    date: now - Duration::days(1),
                    count: 3,
                },
                TrendPoint { date: now, count: 4 },
            ]),
            ..UpdateDashboardRequest::default()
        };
        assert!(body.validate().is_ok());
    }

    #[test]
    fn apply_replaces_only_provided_sections() {
        let now = OffsetDateTime::now_utc();
        let mut record = sample_record(now);
        let before_trends = record.incident_trends.len();

        let body = UpdateDashboardRequest {
            threat_categories: Some(ThreatCategories {
                malware: 1,
                phishing: 2,
                ddos: 3,
                insider: 4,
                social: 5,
            }),
            ..UpdateDashboardRequest::default()
        };
        body.apply(&mut record);

        assert_eq!(record.threat_categories.malware, 1);
        assert_eq!(record.incident_trends.len(), before_trends);
        assert_eq!(record.compliance_scores.overall, 90);
    }

    #[test]
    fn update_body_deserializes_from_camel_case() {
        let body: UpdateDashboardRequest = serde_json::from_value(serde_json::json!({
            "riskLevels": { "critical": 2, "high": 5, "medium": 10, "low": 14 }
        }))
        .expect("deserialize");
        assert!(body.risk_levels.is_some());
        assert!(body.threat_categories.is_none());
    }

    #[test]
    fn negative_counts_fail_to_deserialize() {
        let result: Result<UpdateDashboardRequest, _> =
            serde_json::from_value(serde_json::json!({
                "vulnerabilityCounts": { "critical": -1, "high": 8, "medium": 15, "low": 20 }
            }));
        assert!(result.is_err());
    }
}
