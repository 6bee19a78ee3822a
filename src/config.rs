use std::collections::BTreeMap;
use std::env;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use dotenvy::dotenv;

use crate::model::leave_request::LeaveType;

/// Thresholds used to classify a finished attendance day.
#[derive(Clone, Debug)]
pub struct WorkPolicy {
    /// Check-ins with an hour strictly greater than this are late.
    pub start_hour: u32,
    pub full_day_hours: f64,
    pub half_day_hours: f64,
}

impl Default for WorkPolicy {
    fn default() -> Self {
        Self {
            start_hour: 9,
            full_day_hours: 8.0,
            half_day_hours: 4.0,
        }
    }
}

/// Yearly leave allotment. Only the listed types are tracked in balances.
#[derive(Clone, Debug, PartialEq)]
pub struct LeaveAllotment(pub BTreeMap<LeaveType, i64>);

impl Default for LeaveAllotment {
    fn default() -> Self {
        Self(BTreeMap::from([
            (LeaveType::Sick, 0),
            (LeaveType::Casual, 0),
            (LeaveType::Earned, 0),
        ]))
    }
}

impl FromStr for LeaveAllotment {
    type Err = anyhow::Error;

    /// Parses `sick=12,casual=10,earned=15`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut map = BTreeMap::new();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (kind, days) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("expected <type>=<days>, got `{pair}`"))?;
            let kind = LeaveType::from_str(kind.trim())
                .map_err(|_| anyhow!("unknown leave type `{}`", kind.trim()))?;
            let days = days
                .trim()
                .parse::<i64>()
                .with_context(|| format!("invalid day count for {kind}"))?;
            map.insert(kind, days);
        }
        Ok(Self(map))
    }
}

/// How far back the missing-attendance report looks.
#[derive(Clone, Debug)]
pub struct MissingReport {
    pub lookback_days: u32,
    pub limit: usize,
}

impl Default for MissingReport {
    fn default() -> Self {
        Self {
            lookback_days: 45,
            limit: 100,
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub api_prefix: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub work: WorkPolicy,
    pub allotment: LeaveAllotment,
    pub missing: MissingReport,
    pub employee_cache_ttl_secs: u64,
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parsed_or<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse::<T>()
        .map_err(|e| anyhow!("{key}: cannot parse `{raw}`: {e}"))
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", "1000")?,

            work: WorkPolicy {
                start_hour: parsed_or("WORK_START_HOUR", "9")?,
                full_day_hours: parsed_or("FULL_DAY_HOURS", "8")?,
                half_day_hours: parsed_or("HALF_DAY_HOURS", "4")?,
            },
            allotment: parsed_or("LEAVE_ALLOTMENT", "sick=0,casual=0,earned=0")?,
            missing: MissingReport {
                lookback_days: parsed_or("MISSING_LOOKBACK_DAYS", "45")?,
                limit: parsed_or("MISSING_REPORT_LIMIT", "100")?,
            },
            employee_cache_ttl_secs: parsed_or("EMPLOYEE_CACHE_TTL_SECS", "300")?,
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests() -> Self {
        Self {
            database_url: "mysql://localhost/hr_test".to_string(),
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            api_prefix: "/api".to_string(),
            rate_protected_per_min: 1000,
            work: WorkPolicy::default(),
            allotment: LeaveAllotment::default(),
            missing: MissingReport::default(),
            employee_cache_ttl_secs: 300,
        }
    }
}
