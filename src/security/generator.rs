use rand::Rng;
use time::{Duration, OffsetDateTime, Weekday};

use crate::security::dto::{
    ComplianceScores, RiskLevels, SecurityRecord, ThreatCategories, TrendPoint,
    VulnerabilityCounts,
};

/// Trend window for dashboard reads. Seed tooling uses a 30-day window
/// through the same `trend_days` parameter.
pub const DASHBOARD_TREND_DAYS: i64 = 7;

/// Produces a fully populated metric snapshot from bounded random draws.
/// No I/O; every field respects its documented interval.
pub fn generate(now: OffsetDateTime, trend_days: i64) -> SecurityRecord {
    let mut rng = rand::thread_rng();

    SecurityRecord {
        threat_categories: ThreatCategories {
            malware: rng.gen_range(15..60),
            phishing: rng.gen_range(10..45),
            ddos: rng.gen_range(5..25),
            insider: rng.gen_range(3..18),
            social: rng.gen_range(8..38),
        },
        vulnerability_counts: VulnerabilityCounts {
            critical: rng.gen_range(2..10),
            high: rng.gen_range(8..23),
            medium: rng.gen_range(15..40),
            low: rng.gen_range(20..55),
        },
        incident_trends: incident_trend(&mut rng, now, trend_days),
        compliance_scores: ComplianceScores {
            overall: rng.gen_range(75..100),
            network: rng.gen_range(80..100),
            application: rng.gen_range(75..100),
            data: rng.gen_range(85..100),
            physical: rng.gen_range(70..100),
        },
        risk_levels: RiskLevels {
            critical: rng.gen_range(1..5),
            high: rng.gen_range(3..11),
            medium: rng.gen_range(8..20),
            low: rng.gen_range(10..25),
        },
        last_updated: now,
    }
}

/// One point per trailing day ending at `now`, base 15 incidents with a
/// [-10, 10) variation, scaled down to 70% on weekends, floored at 5.
fn incident_trend(rng: &mut impl Rng, now: OffsetDateTime, days: i64) -> Vec<TrendPoint> {
    let mut points = Vec::with_capacity(days.max(0) as usize);
    for i in (0..days).rev() {
        let date = now - Duration::days(i);
        let variation: i64 = rng.gen_range(-10..10);
        let weekend = matches!(date.weekday(), Weekday::Saturday | Weekday::Sunday);
        let factor = if weekend { 0.7 } else { 1.0 };
        let count = (((15 + variation) as f64) * factor).floor() as i64;
        points.push(TrendPoint {
            date,
            count: count.max(5) as u32,
        });
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_in(value: u32, range: std::ops::Range<u32>, field: &str) {
        assert!(range.contains(&value), "{field} = {value} outside {range:?}");
    }

    #[test]
    fn every_field_respects_its_interval() {
        let now = OffsetDateTime::now_utc();
        for _ in 0..50 {
            let r = generate(now, DASHBOARD_TREND_DAYS);

            assert_in(r.threat_categories.malware, 15..60, "malware");
            assert_in(r.threat_categories.phishing, 10..45, "phishing");
            assert_in(r.threat_categories.ddos, 5..25, "ddos");
            assert_in(r.threat_categories.insider, 3..18, "insider");
            assert_in(r.threat_categories.social, 8..38, "social");

            assert_in(r.vulnerability_counts.critical, 2..10, "vuln critical");
            assert_in(r.vulnerability_counts.high, 8..23, "vuln high");
            assert_in(r.vulnerability_counts.medium, 15..40, "vuln medium");
            assert_in(r.vulnerability_counts.low, 20..55, "vuln low");

            assert_in(r.compliance_scores.overall, 75..100, "overall");
            assert_in(r.compliance_scores.network, 80..100, "network");
            assert_in(r.compliance_scores.application, 75..100, "application");
            assert_in(r.compliance_scores.data, 85..100, "data");
            assert_in(r.compliance_scores.physical, 70..100, "physical");

            assert_in(r.risk_levels.critical, 1..5, "risk critical");
            assert_in(r.risk_levels.high, 3..11, "risk high");
            assert_in(r.risk_levels.medium, 8..20, "risk medium");
            assert_in(r.risk_levels.low, 10..25, "risk low");

            assert_eq!(r.last_updated, now);
        }
    }

    #[test]
    fn trend_covers_the_requested_window() {
        let now = OffsetDateTime::now_utc();
        for days in [DASHBOARD_TREND_DAYS, 30] {
            let trend = generate(now, days).incident_trends;
            assert_eq!(trend.len(), days as usize);
            assert_eq!(trend.last().expect("non-empty").date, now);
        }
    }

    #[test]
    fn trend_dates_ascend_one_day_apart() {
        let now = OffsetDateTime::now_utc();
        let trend = generate(now, 30).incident_trends;
        for pair in trend.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
    }

    #[test]
    fn trend_counts_stay_within_formula_bounds() {
        let now = OffsetDateTime::now_utc();
        for _ in 0..20 {
            for point in generate(now, 30).incident_trends {
                // base 15 + [-10, 10) caps the draw at 24, the floor at 5.
                assert!((5..=24).contains(&point.count), "count = {}", point.count);
            }
        }
    }
}
