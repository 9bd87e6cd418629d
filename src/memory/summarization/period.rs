//! Time buckets for period summaries.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc,
};
use serde::{Deserialize, Serialize};

use crate::memory::core::ids::InteractionId;
use crate::memory::summarization::summarizer::ConversationSummary;

/// Granularity used to group interactions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarizationPeriod {
    /// Top of the hour.
    Hourly,
    /// Midnight.
    Daily,
    /// Monday midnight of the ISO week.
    Weekly,
}

impl SummarizationPeriod {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }

    /// Nominal length of one bucket, ignoring DST shifts.
    #[must_use]
    pub fn duration(self) -> Duration {
        match self {
            Self::Hourly => Duration::hours(1),
            Self::Daily => Duration::days(1),
            Self::Weekly => Duration::weeks(1),
        }
    }
}

impl fmt::Display for SummarizationPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SummarizationPeriod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            _ => Err(value.to_string()),
        }
    }
}

/// Start of the bucket containing `timestamp`, evaluated on the wall clock of `tz`.
///
/// Hourly buckets floor the offset-aware local time, so the two passes through
/// a repeated hour stay separate. Midnights skipped by a DST transition resolve
/// to the instant right after the gap; ambiguous ones resolve to the earlier
/// instant.
#[must_use]
pub fn start_of_period<Tz: TimeZone>(
    timestamp: DateTime<Utc>,
    period: SummarizationPeriod,
    tz: &Tz,
) -> DateTime<Utc> {
    let local = timestamp.with_timezone(tz);
    if period == SummarizationPeriod::Hourly {
        let into_hour = Duration::minutes(i64::from(local.minute()))
            + Duration::seconds(i64::from(local.second()))
            + Duration::nanoseconds(i64::from(local.nanosecond()));
        return (local - into_hour).with_timezone(&Utc);
    }

    let date = local.date_naive();
    let first_day = match period {
        SummarizationPeriod::Weekly => {
            date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
        }
        _ => date,
    };
    midnight(first_day, tz).unwrap_or(timestamp)
}

/// Exclusive end of the bucket containing `timestamp`.
///
/// Daily and weekly buckets end at the next local boundary, so a bucket
/// spanning a DST change lasts 23, 25, 167 or 169 hours.
#[must_use]
pub fn end_of_period<Tz: TimeZone>(
    timestamp: DateTime<Utc>,
    period: SummarizationPeriod,
    tz: &Tz,
) -> DateTime<Utc> {
    let start = start_of_period(timestamp, period, tz);
    let nominal = start + period.duration();
    if period == SummarizationPeriod::Hourly {
        return nominal;
    }

    let next_day = start.with_timezone(tz).date_naive() + period.duration();
    midnight(next_day, tz).unwrap_or(nominal)
}

fn midnight<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).and_then(|naive| resolve_local(naive, tz))
}

fn resolve_local<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Option<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(start) => Some(start.with_timezone(&Utc)),
        LocalResult::Ambiguous(first, second) => {
            Some(first.with_timezone(&Utc).min(second.with_timezone(&Utc)))
        }
        LocalResult::None => {
            // inside a DST gap: walk forward until the wall clock exists again
            let mut probe = naive;
            for _ in 0..24 * 4 {
                probe += Duration::minutes(15);
                if let Some(start) = tz.from_local_datetime(&probe).earliest() {
                    return Some(start.with_timezone(&Utc));
                }
            }
            None
        }
    }
}

/// Summary of the interactions that fell into one bucket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodSummary {
    /// Bucket granularity.
    pub period: SummarizationPeriod,
    /// Inclusive bucket start.
    pub start_date: DateTime<Utc>,
    /// Exclusive bucket end, the next boundary on the same wall clock.
    pub end_date: DateTime<Utc>,
    /// Ids of the bucket members in input order.
    pub interaction_ids: Vec<InteractionId>,
    /// Summary of the bucket members.
    pub summary: ConversationSummary,
}

impl PeriodSummary {
    /// Whether `timestamp` falls inside `[start_date, end_date)`.
    #[must_use]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start_date <= timestamp && timestamp < self.end_date
    }
}
