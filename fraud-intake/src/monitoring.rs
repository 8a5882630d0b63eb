use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::random::{RandomSource, round_to};

const LLM_WINDOW_HOURS: i64 = 24;
const COST_PER_1K_TOKENS: f64 = 0.03;
pub const LOG_LINE_COUNT: usize = 10;

// INFO is weighted three to one against each of the others
const LOG_LEVELS: [LogLevel; 5] = [
    LogLevel::Info,
    LogLevel::Info,
    LogLevel::Info,
    LogLevel::Warning,
    LogLevel::Error,
];
const LOGGED_ENDPOINTS: [&str; 4] = ["/v1/extract", "/v1/chat", "/v1/graph/query", "/health"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemLoad {
    pub cpu: u32,
    pub memory: u32,
    pub latency_ms: u32,
    pub threads: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmUsage {
    /// Hour bucket, formatted `HH:00`
    pub time: String,
    pub tokens: u32,
    pub cost: f64,
    pub requests: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        };
        f.write_str(label)
    }
}

/// One line of the mock service log. Displays as `[HH:MM:SS] [LEVEL] message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub timestamp: String,
    pub level: LogLevel,
    pub endpoint: String,
    pub message: String,
}

impl LogLine {
    pub fn new(timestamp: impl Into<String>, level: LogLevel, endpoint: &str) -> Self {
        let message = match level {
            LogLevel::Info => format!("Request processed for {endpoint}"),
            LogLevel::Warning => format!("High latency detected on {endpoint}"),
            LogLevel::Error => format!("Connection timeout on {endpoint}"),
        };
        Self {
            timestamp: timestamp.into(),
            level,
            endpoint: endpoint.to_string(),
            message,
        }
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] [{}] {}", self.timestamp, self.level, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub system: SystemLoad,
    pub llm_usage: Vec<LlmUsage>,
    pub logs: Vec<LogLine>,
}

fn pick<T: Copy>(rng: &mut dyn RandomSource, items: &[T]) -> T {
    let last = u32::try_from(items.len().saturating_sub(1)).unwrap_or(u32::MAX);
    let index = rng.uniform_int(0, last) as usize;
    items[index.min(items.len() - 1)]
}

/// Mock log tail, all stamped with the time of `now`
pub fn log_lines(rng: &mut dyn RandomSource, now: NaiveDateTime) -> Vec<LogLine> {
    let timestamp = now.format("%H:%M:%S").to_string();
    (0..LOG_LINE_COUNT)
        .map(|_| {
            let level = pick(rng, &LOG_LEVELS);
            let endpoint = pick(rng, &LOGGED_ENDPOINTS);
            LogLine::new(timestamp.clone(), level, endpoint)
        })
        .collect()
}

/// Mock system load plus hourly LLM usage for the 24 hours ending at `now`
pub fn system_snapshot(rng: &mut dyn RandomSource, now: NaiveDateTime) -> SystemSnapshot {
    let system = SystemLoad {
        cpu: rng.uniform_int(20, 65),
        memory: rng.uniform_int(40, 80),
        latency_ms: rng.uniform_int(150, 800),
        threads: rng.uniform_int(4, 12),
    };

    let llm_usage = (0..LLM_WINDOW_HOURS)
        .rev()
        .map(|hours_ago| {
            let hour = now - TimeDelta::hours(hours_ago);
            let tokens = rng.uniform_int(1000, 5000);
            LlmUsage {
                time: hour.format("%H:00").to_string(),
                tokens,
                cost: round_to(f64::from(tokens) / 1000.0 * COST_PER_1K_TOKENS, 4),
                requests: rng.uniform_int(10, 50),
            }
        })
        .collect();

    let logs = log_lines(rng, now);

    SystemSnapshot {
        system,
        llm_usage,
        logs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};
    use chrono::NaiveDate;

    fn morning() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[test]
    fn snapshot_shape() {
        let now = NaiveDate::from_ymd_opt(2025, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let snap = system_snapshot(&mut SeededRandom::new(8), now);

        assert!((20..=65).contains(&snap.system.cpu));
        assert!((150..=800).contains(&snap.system.latency_ms));
        assert_eq!(snap.llm_usage.len(), 24);
        assert_eq!(snap.llm_usage.first().unwrap().time, "10:00");
        assert_eq!(snap.llm_usage.last().unwrap().time, "09:00");

        for row in &snap.llm_usage {
            let expected = f64::from(row.tokens) / 1000.0 * COST_PER_1K_TOKENS;
            assert!((row.cost - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn log_lines_follow_level() {
        // (level index, endpoint index) pairs
        let mut rng = ScriptedRandom::ints([0, 0, 3, 1, 4, 3, 2, 2]);
        let logs = log_lines(&mut rng, morning());

        assert_eq!(logs.len(), LOG_LINE_COUNT);
        assert_eq!(
            logs[0].to_string(),
            "[09:30:00] [INFO] Request processed for /v1/extract"
        );
        assert_eq!(
            logs[1].to_string(),
            "[09:30:00] [WARNING] High latency detected on /v1/chat"
        );
        assert_eq!(
            logs[2].to_string(),
            "[09:30:00] [ERROR] Connection timeout on /health"
        );
        assert_eq!(logs[3].endpoint, "/v1/graph/query");
        // script exhausted, lower bound picks the first entries
        assert_eq!(logs[9].level, LogLevel::Info);
        assert_eq!(logs[9].endpoint, "/v1/extract");
    }

    #[test]
    fn snapshot_carries_log_tail() {
        let snap = system_snapshot(&mut SeededRandom::new(21), morning());
        assert_eq!(snap.logs.len(), LOG_LINE_COUNT);
        for line in &snap.logs {
            assert!(LOGGED_ENDPOINTS.contains(&line.endpoint.as_str()));
            assert!(line.to_string().starts_with("[09:30:00] ["));
        }

        let json = serde_json::to_value(&snap).unwrap();
        assert!(json["logs"][0]["level"].is_string());
    }
}
