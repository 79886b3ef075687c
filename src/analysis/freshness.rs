use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::Commit;

/// How far a run lags behind the newest zarr commit.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum Freshness {
    Current,
    SlightlyBehind { hours: f64 },
    Outdated { days: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FreshnessCheck {
    pub commit: Commit,
    pub freshness: Freshness,
}

pub fn assess(run_started: DateTime<Utc>, commit_date: DateTime<Utc>) -> Freshness {
    let hours = (run_started - commit_date).num_seconds().abs() as f64 / 3600.0;

    if hours <= 24.0 && run_started >= commit_date {
        Freshness::Current
    } else if hours <= 72.0 {
        Freshness::SlightlyBehind { hours }
    } else {
        Freshness::Outdated { days: hours / 24.0 }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_assess() {
        assert_eq!(assess(at(10, 12), at(10, 0)), Freshness::Current);
        assert_eq!(
            assess(at(10, 0), at(10, 6)),
            Freshness::SlightlyBehind { hours: 6.0 }
        );
        assert_eq!(
            assess(at(13, 0), at(10, 0)),
            Freshness::SlightlyBehind { hours: 72.0 }
        );
        assert_eq!(assess(at(15, 0), at(10, 0)), Freshness::Outdated { days: 5.0 });
    }
}
