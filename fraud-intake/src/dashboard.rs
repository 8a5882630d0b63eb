use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::random::{RandomSource, round_to};

pub const DASHBOARD_WINDOW_DAYS: u64 = 30;

/// Alerts scoring above this are high risk
pub const HIGH_RISK_SCORE: f64 = 0.7;
/// Alerts scoring below this are low risk
pub const LOW_RISK_SCORE: f64 = 0.4;

const CLAIM_TYPE_COUNTS: [(&str, u32); 5] = [
    ("Auto Accident", 450),
    ("Theft", 120),
    ("Medical", 300),
    ("Property Damage", 250),
    ("Life", 125),
];

// (claim id, claim type, score, yyyy, mm, dd)
const RECENT_ALERTS: [(&str, &str, f64, i32, u32, u32); 5] = [
    ("CLM-9921", "Auto", 0.92, 2025, 11, 22),
    ("CLM-9920", "Medical", 0.65, 2025, 11, 22),
    ("CLM-9918", "Theft", 0.88, 2025, 11, 21),
    ("CLM-9915", "Property", 0.12, 2025, 11, 21),
    ("CLM-9902", "Auto", 0.95, 2025, 11, 20),
];

/// Portfolio-wide figures shown above the charts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashboardHeadline {
    pub total_claims: u64,
    pub fraud_claims: u64,
    /// Value of flagged claims, whole dollars
    pub fraud_value: u64,
    /// Mean processing time, seconds
    pub proc_time: f64,
}

impl Default for DashboardHeadline {
    fn default() -> Self {
        Self {
            total_claims: 1245,
            fraud_claims: 84,
            fraud_value: 450_000,
            proc_time: 1.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimTypeCount {
    pub claim_type: String,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn for_score(score: f64) -> Self {
        if score > HIGH_RISK_SCORE {
            RiskLevel::High
        } else if score >= LOW_RISK_SCORE {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FraudAlert {
    pub claim_id: String,
    pub claim_type: String,
    pub risk: RiskLevel,
    pub score: f64,
    pub date: NaiveDate,
}

impl FraudAlert {
    pub fn new(
        claim_id: impl Into<String>,
        claim_type: impl Into<String>,
        score: f64,
        date: NaiveDate,
    ) -> Self {
        Self {
            claim_id: claim_id.into(),
            claim_type: claim_type.into(),
            risk: RiskLevel::for_score(score),
            score,
            date,
        }
    }
}

pub fn claim_type_distribution() -> Vec<ClaimTypeCount> {
    CLAIM_TYPE_COUNTS
        .iter()
        .map(|(claim_type, count)| ClaimTypeCount {
            claim_type: claim_type.to_string(),
            count: *count,
        })
        .collect()
}

/// Most recent alerts, newest first
pub fn recent_alerts() -> Vec<FraudAlert> {
    RECENT_ALERTS
        .iter()
        .filter_map(|(id, claim_type, score, y, m, d)| {
            NaiveDate::from_ymd_opt(*y, *m, *d)
                .map(|date| FraudAlert::new(*id, *claim_type, *score, date))
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCounts {
    pub date: NaiveDate,
    pub frauds: u32,
    pub legit: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardAggregate {
    pub total_frauds: u64,
    pub total_legit: u64,
    /// Percentage of fraudulent claims, two decimals
    pub fraud_rate: f64,
    pub timeseries: Vec<DailyCounts>,
    pub headline: DashboardHeadline,
    pub claim_types: Vec<ClaimTypeCount>,
    pub recent_alerts: Vec<FraudAlert>,
}

impl DashboardAggregate {
    /// Derive totals and rate from a per-day series.
    ///
    /// An empty or all-zero series yields a rate of 0.0. Headline figures and
    /// breakdowns are the fixed portfolio values.
    pub fn from_series(timeseries: Vec<DailyCounts>) -> Self {
        let total_frauds: u64 = timeseries.iter().map(|d| u64::from(d.frauds)).sum();
        let total_legit: u64 = timeseries.iter().map(|d| u64::from(d.legit)).sum();
        Self {
            total_frauds,
            total_legit,
            fraud_rate: fraud_rate(total_frauds, total_legit),
            timeseries,
            headline: DashboardHeadline::default(),
            claim_types: claim_type_distribution(),
            recent_alerts: recent_alerts(),
        }
    }
}

pub fn fraud_rate(total_frauds: u64, total_legit: u64) -> f64 {
    let total = total_frauds + total_legit;
    if total == 0 {
        return 0.0;
    }
    round_to(total_frauds as f64 / total as f64 * 100.0, 2)
}

/// Mock 30-day window ending on `today`, oldest day first
pub fn dashboard_aggregate(rng: &mut dyn RandomSource, today: NaiveDate) -> DashboardAggregate {
    let series = (0..DASHBOARD_WINDOW_DAYS)
        .rev()
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .map(|date| DailyCounts {
            date,
            frauds: rng.uniform_int(1, 8),
            legit: rng.uniform_int(10, 40),
        })
        .collect();

    let aggregate = DashboardAggregate::from_series(series);
    debug!(
        total_frauds = aggregate.total_frauds,
        total_legit = aggregate.total_legit,
        fraud_rate = aggregate.fraud_rate,
        "Dashboard aggregate generated"
    );
    aggregate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_covers_thirty_days_ending_today() {
        let today = day(2025, 3, 10);
        let agg = dashboard_aggregate(&mut SeededRandom::new(5), today);

        assert_eq!(agg.timeseries.len(), 30);
        assert_eq!(agg.timeseries.first().unwrap().date, day(2025, 2, 9));
        assert_eq!(agg.timeseries.last().unwrap().date, today);
        for pair in agg.timeseries.windows(2) {
            assert_eq!(pair[0].date.succ_opt().unwrap(), pair[1].date);
        }
    }

    #[test]
    fn totals_and_rate_are_derived_from_series() {
        let agg = dashboard_aggregate(&mut SeededRandom::new(11), day(2025, 1, 1));

        let sum: u64 = agg
            .timeseries
            .iter()
            .map(|d| u64::from(d.frauds + d.legit))
            .sum();
        assert_eq!(agg.total_frauds + agg.total_legit, sum);

        let expected =
            100.0 * agg.total_frauds as f64 / (agg.total_frauds + agg.total_legit) as f64;
        assert!((agg.fraud_rate - expected).abs() <= 0.01);

        for d in &agg.timeseries {
            assert!((1..=8).contains(&d.frauds));
            assert!((10..=40).contains(&d.legit));
        }
    }

    #[test]
    fn exact_values_with_scripted_source() {
        let draws = (0..30).flat_map(|_| [2u32, 18u32]);
        let agg = dashboard_aggregate(&mut ScriptedRandom::ints(draws), day(2025, 6, 30));
        assert_eq!(agg.total_frauds, 60);
        assert_eq!(agg.total_legit, 540);
        assert_eq!(agg.fraud_rate, 10.0);
    }

    #[test]
    fn zero_totals_do_not_divide_by_zero() {
        let agg = DashboardAggregate::from_series(Vec::new());
        assert_eq!(agg.fraud_rate, 0.0);

        let zeros = DashboardAggregate::from_series(vec![DailyCounts {
            date: day(2025, 1, 1),
            frauds: 0,
            legit: 0,
        }]);
        assert_eq!(zeros.fraud_rate, 0.0);
    }

    #[test]
    fn headline_and_breakdowns() {
        let agg = dashboard_aggregate(&mut SeededRandom::new(3), day(2025, 11, 23));

        assert_eq!(agg.headline.total_claims, 1245);
        assert_eq!(agg.headline.fraud_claims, 84);
        assert_eq!(agg.headline.fraud_value, 450_000);
        assert_eq!(agg.headline.proc_time, 1.2);

        let types: Vec<(&str, u32)> = agg
            .claim_types
            .iter()
            .map(|t| (t.claim_type.as_str(), t.count))
            .collect();
        assert_eq!(types[0], ("Auto Accident", 450));
        assert_eq!(types.len(), 5);
        assert_eq!(types.iter().map(|(_, c)| c).sum::<u32>(), 1245);
    }

    #[test]
    fn alerts_are_newest_first_with_risk_from_score() {
        let alerts = recent_alerts();
        assert_eq!(alerts.len(), 5);
        assert_eq!(alerts[0].claim_id, "CLM-9921");
        for pair in alerts.windows(2) {
            assert!(pair[0].date >= pair[1].date);
        }
        for alert in &alerts {
            assert_eq!(alert.risk, RiskLevel::for_score(alert.score));
        }
        assert_eq!(alerts[1].risk, RiskLevel::Medium);
        assert_eq!(alerts[3].risk, RiskLevel::Low);
        assert_eq!(alerts[4].risk, RiskLevel::High);
    }

    #[test]
    fn dates_serialize_as_iso_strings() {
        let agg = DashboardAggregate::from_series(vec![DailyCounts {
            date: day(2025, 11, 22),
            frauds: 3,
            legit: 27,
        }]);
        let json = serde_json::to_value(&agg).unwrap();
        assert_eq!(json["timeseries"][0]["date"], "2025-11-22");
        assert_eq!(json["fraud_rate"], 10.0);
        assert_eq!(json["recent_alerts"][0]["date"], "2025-11-22");
        assert_eq!(json["recent_alerts"][0]["risk"], "High");
        assert_eq!(json["headline"]["fraud_value"], 450_000);
    }
}
