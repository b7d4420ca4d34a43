//! Metrics Engine
//!
//! Recomputes the derived figures stored on packages, tasks, daily summaries
//! and tag summaries. Every function works on the snapshot it is handed and
//! never touches storage or the clock: callers pass `now`/`date` explicitly,
//! so re-running a function on the same snapshot yields the same values.
//!
//! Rates never divide by zero. A zero denominator either yields 0.0 or leaves
//! the previously stored value in place, depending on the figure.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::ratio;
use crate::domain::entities::{
    Call, CallTag, DialTask, LeadPackage, MetricsSummary, PackageTagSummary,
};
use crate::domain::value_objects::{DateRange, InterestPolicy};

/// Call counts for one package, computed without mutating it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PackageCallStats {
    pub total_calls: usize,
    pub connected_calls: usize,
    pub contact_rate: f64,
    pub has_call_data: bool,
}

/// One day of the trend series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub total_packages: i32,
    pub new_packages: i32,
    pub total_leads: i64,
    pub total_calls: i32,
    pub connected_calls: i32,
    pub total_duration: i64,
    pub avg_contact_rate: f64,
    pub avg_interest_rate: f64,
    pub avg_call_duration: i32,
    pub total_cost: f64,
    /// True when no summary was stored for this day
    pub is_placeholder: bool,
}

impl TrendPoint {
    /// Zero-valued entry for a day without a stored summary
    pub fn placeholder(date: NaiveDate) -> Self {
        Self {
            date,
            total_packages: 0,
            new_packages: 0,
            total_leads: 0,
            total_calls: 0,
            connected_calls: 0,
            total_duration: 0,
            avg_contact_rate: 0.0,
            avg_interest_rate: 0.0,
            avg_call_duration: 0,
            total_cost: 0.0,
            is_placeholder: true,
        }
    }
}

impl From<&MetricsSummary> for TrendPoint {
    fn from(summary: &MetricsSummary) -> Self {
        Self {
            date: summary.date,
            total_packages: summary.total_packages,
            new_packages: summary.new_packages,
            total_leads: summary.total_leads,
            total_calls: summary.total_calls,
            connected_calls: summary.connected_calls,
            total_duration: summary.total_duration,
            avg_contact_rate: summary.avg_contact_rate,
            avg_interest_rate: summary.avg_interest_rate,
            avg_call_duration: summary.avg_call_duration,
            total_cost: summary.total_cost,
            is_placeholder: false,
        }
    }
}

/// Calls that belong to one of the package's tasks
fn package_calls<'a>(
    package: &LeadPackage,
    tasks: &[DialTask],
    calls: &'a [Call],
) -> impl Iterator<Item = &'a Call> {
    let task_ids: HashSet<i32> = tasks
        .iter()
        .filter(|task| task.package_id == package.id)
        .map(|task| task.id)
        .collect();

    calls
        .iter()
        .filter(move |call| task_ids.contains(&call.task_id))
}

/// Count a package's calls and their contact rate (0.0 without calls)
pub fn package_call_statistics(
    package: &LeadPackage,
    tasks: &[DialTask],
    calls: &[Call],
) -> PackageCallStats {
    let (total_calls, connected_calls) =
        package_calls(package, tasks, calls).fold((0, 0), |(total, connected), call| {
            (total + 1, connected + usize::from(call.is_connected()))
        });

    PackageCallStats {
        total_calls,
        connected_calls,
        contact_rate: ratio(connected_calls, total_calls),
        has_call_data: total_calls > 0,
    }
}

/// Refresh a package's total cost and contact rate.
///
/// With calls on record the contact rate is recomputed from them. Without
/// calls the stored rate is kept, except that a rate of exactly 0 is replaced
/// by the valid/total lead ratio (capped at 1.0) as an initial estimate.
pub fn compute_package_metrics(
    package: &mut LeadPackage,
    tasks: &[DialTask],
    calls: &[Call],
) -> PackageCallStats {
    if package.cost_per_lead > 0.0 {
        package.total_cost = f64::from(package.total_leads) * package.cost_per_lead;
    }

    let stats = package_call_statistics(package, tasks, calls);

    if stats.has_call_data {
        package.contact_rate = stats.contact_rate;
    } else if package.contact_rate == 0.0 && package.total_leads > 0 {
        let estimate =
            (f64::from(package.valid_leads) / f64::from(package.total_leads)).min(1.0);
        tracing::debug!(
            package_id = package.id,
            estimate,
            "No calls recorded, estimating contact rate from valid leads"
        );
        package.contact_rate = estimate;
    }

    stats
}

/// Refresh a task's call counters.
///
/// `connected_calls` uses the result code only; `interested_calls` counts
/// calls carrying at least one tag accepted by `policy`.
pub fn compute_task_metrics(
    task: &mut DialTask,
    calls: &[Call],
    tags_by_call: &HashMap<i32, Vec<CallTag>>,
    policy: &InterestPolicy,
) {
    let mut total = 0;
    let mut connected = 0;
    let mut interested = 0;

    for call in calls.iter().filter(|call| call.task_id == task.id) {
        total += 1;
        if call.result.is_connected() {
            connected += 1;
        }
        if tags_by_call
            .get(&call.id)
            .is_some_and(|tags| policy.is_interested(tags))
        {
            interested += 1;
        }
    }

    task.total_calls = total;
    task.connected_calls = connected;
    task.interested_calls = interested;
}

/// Group tags by call id, the shape `compute_task_metrics` expects
pub fn group_tags_by_call(tags: Vec<CallTag>) -> HashMap<i32, Vec<CallTag>> {
    let mut grouped: HashMap<i32, Vec<CallTag>> = HashMap::new();
    for tag in tags {
        grouped.entry(tag.call_id).or_default().push(tag);
    }
    grouped
}

/// Build the summary row for `date`, updating `existing` in place when the
/// day already has one.
///
/// Package figures cover every package; call figures cover only calls dialed
/// on `date`. Averages with a zero denominator keep their previous value.
pub fn compute_daily_summary(
    date: NaiveDate,
    packages: &[LeadPackage],
    calls: &[Call],
    existing: Option<MetricsSummary>,
    now: DateTime<Utc>,
) -> MetricsSummary {
    let mut summary = existing.unwrap_or_else(|| MetricsSummary::new(date, now));
    summary.date = date;

    summary.total_packages = packages.len() as i32;
    summary.new_packages = packages
        .iter()
        .filter(|package| package.created_at.date_naive() == date)
        .count() as i32;
    summary.total_leads = packages
        .iter()
        .map(|package| i64::from(package.total_leads))
        .sum();

    let day_calls: Vec<&Call> = calls.iter().filter(|call| call.call_date() == date).collect();
    summary.total_calls = day_calls.len() as i32;
    summary.connected_calls = day_calls
        .iter()
        .filter(|call| call.result.is_connected())
        .count() as i32;

    if summary.total_calls > 0 {
        summary.avg_contact_rate =
            f64::from(summary.connected_calls) / f64::from(summary.total_calls);
    }

    summary.total_duration = day_calls
        .iter()
        .map(|call| i64::from(call.duration))
        .sum();

    if summary.connected_calls > 0 {
        summary.avg_call_duration =
            (summary.total_duration / i64::from(summary.connected_calls)) as i32;
    }

    summary.total_cost = packages.iter().map(|package| package.total_cost).sum();
    summary.updated_at = now;

    summary
}

/// Tag distribution for one package.
///
/// One row per (tag_name, tag_value) ordered by name then value; each
/// percentage is relative to all tags sharing the same name.
pub fn compute_tag_summary(
    package_id: i32,
    tags: &[CallTag],
    now: DateTime<Utc>,
) -> Vec<PackageTagSummary> {
    let mut counts: BTreeMap<(&str, Option<&str>), i32> = BTreeMap::new();
    let mut totals: HashMap<&str, i32> = HashMap::new();

    for tag in tags {
        *counts
            .entry((tag.tag_name.as_str(), tag.tag_value.as_deref()))
            .or_insert(0) += 1;
        *totals.entry(tag.tag_name.as_str()).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .map(|((tag_name, tag_value), tag_count)| {
            let total = totals.get(tag_name).copied().unwrap_or(0);
            let percentage = if total > 0 {
                f64::from(tag_count) / f64::from(total)
            } else {
                0.0
            };

            PackageTagSummary {
                id: 0,
                package_id,
                tag_name: tag_name.to_string(),
                tag_value: tag_value.map(str::to_string),
                tag_count,
                percentage,
                created_at: now,
                updated_at: now,
            }
        })
        .collect()
}

/// One entry per day of `range`, ascending.
///
/// Days without a stored summary get a zero placeholder, so the series length
/// always equals `range.days()`. Summaries outside the range are ignored.
pub fn compute_trend_series(range: &DateRange, summaries: &[MetricsSummary]) -> Vec<TrendPoint> {
    let by_date: HashMap<NaiveDate, &MetricsSummary> = summaries
        .iter()
        .filter(|summary| range.contains(summary.date))
        .map(|summary| (summary.date, summary))
        .collect();

    range
        .iter()
        .map(|day| match by_date.get(&day) {
            Some(summary) => TrendPoint::from(*summary),
            None => TrendPoint::placeholder(day),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CallResult, NewLeadPackage, TagType};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 18, 12, 0, 0).unwrap()
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn package(id: i32, total: i32, valid: i32, cost: f64) -> LeadPackage {
        let mut package = LeadPackage::new(
            NewLeadPackage {
                name: format!("package-{}", id),
                source: "purchase".to_string(),
                industry: Some("high_school".to_string()),
                region: Some("Jiangsu".to_string()),
                total_leads: total,
                valid_leads: valid,
                cost_per_lead: cost,
            },
            now(),
        );
        package.id = id;
        package
    }

    fn task(id: i32, package_id: i32) -> DialTask {
        let mut task = DialTask::new(package_id, format!("task-{}", id), now());
        task.id = id;
        task
    }

    fn call(id: i32, task_id: i32, result: CallResult, duration: i32) -> Call {
        let mut call = Call::new(task_id, format!("1380000{:04}", id), now(), duration, result);
        call.id = id;
        call
    }

    fn tag(call_id: i32, name: &str, value: &str) -> CallTag {
        CallTag::new(
            call_id,
            name.to_string(),
            Some(value.to_string()),
            TagType::Custom,
            now(),
        )
    }

    #[test]
    fn test_package_without_calls_estimates_contact_rate() {
        let mut pkg = package(1, 1000, 900, 2.5);
        let stats = compute_package_metrics(&mut pkg, &[], &[]);

        assert_eq!(pkg.total_cost, 2500.0);
        assert_eq!(pkg.contact_rate, 0.9);
        assert!(!stats.has_call_data);
        assert_eq!(stats.contact_rate, 0.0);
    }

    #[test]
    fn test_package_estimate_is_capped() {
        let mut pkg = package(1, 100, 150, 0.0);
        compute_package_metrics(&mut pkg, &[], &[]);
        assert_eq!(pkg.contact_rate, 1.0);
        assert_eq!(pkg.total_cost, 0.0);
    }

    #[test]
    fn test_package_keeps_nonzero_rate_without_calls() {
        let mut pkg = package(1, 1000, 900, 2.5);
        pkg.contact_rate = 0.42;
        compute_package_metrics(&mut pkg, &[], &[]);
        assert_eq!(pkg.contact_rate, 0.42);
    }

    #[test]
    fn test_package_with_no_leads_keeps_zero_rate() {
        let mut pkg = package(1, 0, 0, 1.0);
        compute_package_metrics(&mut pkg, &[], &[]);
        assert_eq!(pkg.contact_rate, 0.0);
        assert_eq!(pkg.total_cost, 0.0);
    }

    #[test]
    fn test_package_zero_cost_leaves_total_cost() {
        let mut pkg = package(1, 1000, 900, 0.0);
        pkg.total_cost = 123.0;
        compute_package_metrics(&mut pkg, &[], &[]);
        assert_eq!(pkg.total_cost, 123.0);
    }

    #[test]
    fn test_package_rate_counts_duration_as_connected() {
        let mut pkg = package(1, 1000, 900, 1.0);
        let tasks = vec![task(10, 1), task(11, 1)];
        let calls = vec![
            call(1, 10, CallResult::Connected, 0),
            call(2, 10, CallResult::NoAnswer, 30),
            call(3, 11, CallResult::Busy, 0),
            call(4, 11, CallResult::Rejected, 0),
        ];

        let stats = compute_package_metrics(&mut pkg, &tasks, &calls);

        assert_eq!(stats.total_calls, 4);
        assert_eq!(stats.connected_calls, 2);
        assert_eq!(pkg.contact_rate, 0.5);
    }

    #[test]
    fn test_package_ignores_other_packages_calls() {
        let mut pkg = package(1, 1000, 900, 1.0);
        let tasks = vec![task(10, 1), task(20, 2)];
        let calls = vec![
            call(1, 10, CallResult::Connected, 60),
            call(2, 20, CallResult::NoAnswer, 0),
            call(3, 99, CallResult::NoAnswer, 0),
        ];

        let stats = compute_package_metrics(&mut pkg, &tasks, &calls);

        assert_eq!(stats.total_calls, 1);
        assert_eq!(pkg.contact_rate, 1.0);
    }

    #[test]
    fn test_package_metrics_are_idempotent() {
        let tasks = vec![task(10, 1)];
        let calls = vec![
            call(1, 10, CallResult::Connected, 60),
            call(2, 10, CallResult::NoAnswer, 0),
            call(3, 10, CallResult::Voicemail, 0),
        ];

        let mut once = package(1, 1000, 900, 2.5);
        compute_package_metrics(&mut once, &tasks, &calls);
        let mut twice = once.clone();
        compute_package_metrics(&mut twice, &tasks, &calls);

        assert_eq!(once, twice);

        let mut empty_once = package(2, 1000, 900, 2.5);
        compute_package_metrics(&mut empty_once, &[], &[]);
        let mut empty_twice = empty_once.clone();
        compute_package_metrics(&mut empty_twice, &[], &[]);
        assert_eq!(empty_once, empty_twice);
    }

    #[test]
    fn test_task_metrics() {
        let mut t = task(10, 1);
        let calls = vec![
            call(1, 10, CallResult::Connected, 60),
            call(2, 10, CallResult::NoAnswer, 0),
        ];

        compute_task_metrics(&mut t, &calls, &HashMap::new(), &InterestPolicy::default());

        assert_eq!(t.total_calls, 2);
        assert_eq!(t.connected_calls, 1);
        assert_eq!(t.interested_calls, 0);
        assert_eq!(t.contact_rate(), 0.5);
        assert_eq!(t.interest_rate(), 0.0);
    }

    #[test]
    fn test_task_connected_uses_result_code_only() {
        let mut t = task(10, 1);
        let calls = vec![call(1, 10, CallResult::NoAnswer, 45)];

        compute_task_metrics(&mut t, &calls, &HashMap::new(), &InterestPolicy::default());

        assert_eq!(t.total_calls, 1);
        assert_eq!(t.connected_calls, 0);
    }

    #[test]
    fn test_task_interest_from_tags() {
        let mut t = task(10, 1);
        let calls = vec![
            call(1, 10, CallResult::Connected, 60),
            call(2, 10, CallResult::Connected, 90),
            call(3, 10, CallResult::Connected, 30),
            call(4, 11, CallResult::Connected, 30),
        ];
        let tags = group_tags_by_call(vec![
            tag(1, "interest_level", "high"),
            tag(1, "industry", "tech"),
            tag(2, "interest_level", "low"),
            tag(3, "industry", "high"),
            tag(4, "interest_level", "high"),
        ]);

        compute_task_metrics(&mut t, &calls, &tags, &InterestPolicy::default());

        assert_eq!(t.total_calls, 3);
        assert_eq!(t.connected_calls, 3);
        assert_eq!(t.interested_calls, 1);
        assert!((t.interest_rate() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_task_with_no_calls_resets_counters() {
        let mut t = task(10, 1);
        t.total_calls = 5;
        t.connected_calls = 3;
        t.interested_calls = 1;

        compute_task_metrics(&mut t, &[], &HashMap::new(), &InterestPolicy::default());

        assert_eq!((t.total_calls, t.connected_calls, t.interested_calls), (0, 0, 0));
        assert_eq!(t.contact_rate(), 0.0);
    }

    #[test]
    fn test_daily_summary_counts_only_that_day() {
        let date = day("2025-10-18");
        let mut old = package(1, 1000, 900, 2.0);
        old.created_at = now() - Duration::days(3);
        old.total_cost = 2000.0;
        let mut fresh = package(2, 500, 400, 1.0);
        fresh.total_cost = 500.0;

        let mut yesterday = call(3, 10, CallResult::Connected, 600);
        yesterday.call_time = now() - Duration::days(1);
        let calls = vec![
            call(1, 10, CallResult::Connected, 100),
            call(2, 10, CallResult::Connected, 51),
            call(4, 10, CallResult::NoAnswer, 0),
            call(5, 10, CallResult::Voicemail, 20),
            yesterday,
        ];

        let summary = compute_daily_summary(date, &[old, fresh], &calls, None, now());

        assert_eq!(summary.date, date);
        assert_eq!(summary.total_packages, 2);
        assert_eq!(summary.new_packages, 1);
        assert_eq!(summary.total_leads, 1500);
        assert_eq!(summary.total_calls, 4);
        assert_eq!(summary.connected_calls, 2);
        assert_eq!(summary.avg_contact_rate, 0.5);
        assert_eq!(summary.total_duration, 171);
        assert_eq!(summary.avg_call_duration, 85);
        assert_eq!(summary.total_cost, 2500.0);
        assert_eq!(summary.id, 0);
    }

    #[test]
    fn test_daily_summary_updates_existing_row() {
        let date = day("2025-10-18");
        let mut existing = MetricsSummary::new(date, now() - Duration::hours(6));
        existing.id = 7;
        existing.avg_contact_rate = 0.3;
        existing.avg_call_duration = 42;
        existing.total_revenue = 900.0;
        existing.total_calls = 10;

        let later = now() + Duration::hours(1);
        let summary = compute_daily_summary(date, &[], &[], Some(existing.clone()), later);

        assert_eq!(summary.id, 7);
        assert_eq!(summary.created_at, existing.created_at);
        assert_eq!(summary.updated_at, later);
        assert_eq!(summary.total_calls, 0);
        assert_eq!(summary.avg_contact_rate, 0.3);
        assert_eq!(summary.avg_call_duration, 42);
        assert_eq!(summary.total_revenue, 900.0);
    }

    #[test]
    fn test_daily_summary_is_idempotent() {
        let date = day("2025-10-18");
        let packages = vec![package(1, 1000, 900, 2.5)];
        let calls = vec![call(1, 10, CallResult::Connected, 100)];

        let first = compute_daily_summary(date, &packages, &calls, None, now());
        let second = compute_daily_summary(date, &packages, &calls, Some(first.clone()), now());
        assert_eq!(first, second);
    }

    #[test]
    fn test_tag_summary_percentages() {
        let tags = vec![
            tag(1, "interest_level", "high"),
            tag(2, "interest_level", "high"),
            tag(3, "interest_level", "low"),
            tag(4, "interest_level", "medium"),
            tag(1, "industry", "tech"),
        ];

        let rows = compute_tag_summary(5, &tags, now());

        assert_eq!(rows.len(), 4);
        assert!(rows.iter().all(|row| row.package_id == 5));

        let industry: Vec<_> = rows.iter().filter(|r| r.tag_name == "industry").collect();
        assert_eq!(industry.len(), 1);
        assert_eq!(industry[0].percentage, 1.0);

        let interest: Vec<_> = rows
            .iter()
            .filter(|r| r.tag_name == "interest_level")
            .collect();
        let sum: f64 = interest.iter().map(|r| r.percentage).sum();
        assert!((sum - 1.0).abs() < 1e-9);

        let high = interest
            .iter()
            .find(|r| r.tag_value.as_deref() == Some("high"))
            .unwrap();
        assert_eq!(high.tag_count, 2);
        assert_eq!(high.percentage, 0.5);
    }

    #[test]
    fn test_tag_summary_groups_missing_values() {
        let mut no_value = tag(1, "follow_up", "x");
        no_value.tag_value = None;
        let tags = vec![no_value.clone(), no_value, tag(2, "follow_up", "tomorrow")];

        let rows = compute_tag_summary(1, &tags, now());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].tag_value, None);
        assert_eq!(rows[0].tag_count, 2);
        assert!((rows[0].percentage - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_tag_summary_is_deterministic() {
        let tags = vec![
            tag(1, "b", "2"),
            tag(2, "a", "1"),
            tag(3, "b", "1"),
        ];
        let first = compute_tag_summary(1, &tags, now());
        let mut reversed = tags.clone();
        reversed.reverse();
        let second = compute_tag_summary(1, &reversed, now());

        assert_eq!(first, second);
        let keys: Vec<_> = first
            .iter()
            .map(|r| (r.tag_name.as_str(), r.tag_value.as_deref()))
            .collect();
        assert_eq!(keys, vec![("a", Some("1")), ("b", Some("1")), ("b", Some("2"))]);
    }

    #[test]
    fn test_trend_series_fills_every_day() {
        let start = day("2025-10-12");
        let end = start + Duration::days(6);

        let range = DateRange::new(start, end).unwrap();

        let series = compute_trend_series(&range, &[]);

        assert_eq!(series.len(), 7);
        for (offset, point) in series.iter().enumerate() {
            assert_eq!(point.date, start + Duration::days(offset as i64));
            assert!(point.is_placeholder);
            assert_eq!(point.total_packages, 0);
            assert_eq!(point.total_calls, 0);
            assert_eq!(point.connected_calls, 0);
            assert_eq!(point.avg_contact_rate, 0.0);
        }
    }

    #[test]
    fn test_trend_series_uses_stored_days() {
        let start = day("2025-10-12");
        let end = day("2025-10-14");
        let mut stored = MetricsSummary::new(day("2025-10-13"), now());
        stored.total_calls = 40;
        stored.connected_calls = 10;
        stored.avg_contact_rate = 0.25;
        let outside = MetricsSummary::new(day("2025-10-20"), now());

        let range = DateRange::new(start, end).unwrap();

        let series = compute_trend_series(&range, &[outside, stored]);

        assert_eq!(series.len(), 3);
        assert!(series[0].is_placeholder);
        assert!(!series[1].is_placeholder);
        assert_eq!(series[1].total_calls, 40);
        assert_eq!(series[1].avg_contact_rate, 0.25);
        assert!(series[2].is_placeholder);
    }

    #[test]
    fn test_trend_series_single_day() {
        let range = DateRange::new(day("2025-10-14"), day("2025-10-14")).unwrap();
        let mut stored = MetricsSummary::new(day("2025-10-14"), now());
        stored.total_packages = 3;

        let series = compute_trend_series(&range, &[stored]);

        assert_eq!(series.len(), 1);
        assert_eq!(series[0].total_packages, 3);
        assert!(!series[0].is_placeholder);
    }
}
