//! Key dates for a notice once a route is settled.

use crate::facts::{FactPath, FactStore};
use crate::workflows::eligibility::definition::RouteOutcome;
use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Fact written by the service-date question in every jurisdiction's
/// question set.
pub const PLANNED_SERVICE_DATE: &str = "notice.plannedServiceDate";

/// Court proceedings begun later than this after service need a fresh
/// notice.
const PROCEEDINGS_WINDOW_MONTHS: u32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeTimeline {
    pub service_date: NaiveDate,
    pub notice_period_days: u16,
    /// First day proceedings can be issued after the notice expires.
    pub earliest_proceedings: NaiveDate,
    /// Last day proceedings can rely on this notice.
    pub proceedings_deadline: NaiveDate,
}

/// Derives the timeline from the planned service date fact. Returns `None`
/// until that fact is collected or when it is not a parseable date.
pub fn notice_timeline(outcome: &RouteOutcome, facts: &FactStore) -> Option<NoticeTimeline> {
    let path = FactPath::parse(PLANNED_SERVICE_DATE).ok()?;
    let service_date = facts.get(&path)?.as_date()?;
    let earliest_proceedings = service_date + Duration::days(i64::from(outcome.notice_period_days));
    let proceedings_deadline =
        service_date.checked_add_months(Months::new(PROCEEDINGS_WINDOW_MONTHS))?;
    Some(NoticeTimeline {
        service_date,
        notice_period_days: outcome.notice_period_days,
        earliest_proceedings,
        proceedings_deadline,
    })
}
