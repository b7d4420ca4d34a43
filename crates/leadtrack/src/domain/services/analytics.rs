//! Dashboard analytics
//!
//! Read-only figures for the dashboard and its widgets: headline numbers,
//! per-package breakdowns, remaining lead stock, monthly consumption,
//! calling progress and contact rates grouped by level.
//!
//! Levels are the package `industry` value; packages without one are grouped
//! under [`UNASSIGNED_LEVEL`].

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{ratio, round_to};
use crate::domain::entities::{Call, DialTask, LeadPackage, PackageTagSummary};
use crate::domain::value_objects::{CallResult, TaskStatus};

/// Group key for packages without an industry/level
pub const UNASSIGNED_LEVEL: &str = "unassigned";

/// Days covered by the contact-rate trend
pub const CONNECT_TREND_DAYS: i64 = 7;

fn level_key(package: &LeadPackage) -> String {
    package.level().unwrap_or(UNASSIGNED_LEVEL).to_string()
}

/// Σ total_calls of each package's tasks
fn calls_per_package(tasks: &[DialTask]) -> HashMap<i32, i64> {
    let mut called: HashMap<i32, i64> = HashMap::new();
    for task in tasks {
        *called.entry(task.package_id).or_insert(0) += i64::from(task.total_calls);
    }
    called
}

// ============================================
// Dashboard overview
// ============================================

/// Headline numbers for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    pub total_packages: usize,
    pub total_leads: i64,
    pub avg_contact_rate: f64,
    pub avg_interest_rate: f64,
    pub today_calls: usize,
    pub today_connected: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardOverview {
    pub summary: DashboardSummary,
    pub recent_packages: Vec<LeadPackage>,
}

/// Package totals, mean package rates, today's call counts and the newest packages
pub fn dashboard_overview(
    packages: &[LeadPackage],
    calls: &[Call],
    today: NaiveDate,
    recent_limit: usize,
) -> DashboardOverview {
    let total_packages = packages.len();
    let (avg_contact_rate, avg_interest_rate) = if total_packages == 0 {
        (0.0, 0.0)
    } else {
        let n = total_packages as f64;
        (
            packages.iter().map(|p| p.contact_rate).sum::<f64>() / n,
            packages.iter().map(|p| p.interest_rate).sum::<f64>() / n,
        )
    };

    let todays: Vec<&Call> = calls.iter().filter(|c| c.call_date() == today).collect();

    let mut recent_packages = packages.to_vec();
    recent_packages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    recent_packages.truncate(recent_limit);

    DashboardOverview {
        summary: DashboardSummary {
            total_packages,
            total_leads: packages.iter().map(|p| i64::from(p.total_leads)).sum(),
            avg_contact_rate: round_to(avg_contact_rate, 4),
            avg_interest_rate: round_to(avg_interest_rate, 4),
            today_calls: todays.len(),
            today_connected: todays.iter().filter(|c| c.result.is_connected()).count(),
        },
        recent_packages,
    }
}

// ============================================
// Per-package statistics
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CallStats {
    pub total: usize,
    pub result_distribution: BTreeMap<CallResult, usize>,
}

/// Detail view for one package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageStats {
    pub package: LeadPackage,
    pub task_stats: TaskStats,
    pub call_stats: CallStats,
    pub tag_summaries: Vec<PackageTagSummary>,
}

/// Task status counts, call result distribution and tag summaries of a package.
///
/// Only tasks of this package, and calls of those tasks, are counted.
pub fn package_stats(
    package: LeadPackage,
    tasks: &[DialTask],
    calls: &[Call],
    tag_summaries: Vec<PackageTagSummary>,
) -> PackageStats {
    let own_tasks: Vec<&DialTask> = tasks.iter().filter(|t| t.package_id == package.id).collect();
    let count_status =
        |status: TaskStatus| own_tasks.iter().filter(|t| t.status == status).count();

    let mut result_distribution = BTreeMap::new();
    let mut total = 0;
    for call in calls
        .iter()
        .filter(|c| own_tasks.iter().any(|t| t.id == c.task_id))
    {
        total += 1;
        *result_distribution.entry(call.result).or_insert(0) += 1;
    }

    PackageStats {
        task_stats: TaskStats {
            total: own_tasks.len(),
            completed: count_status(TaskStatus::Completed),
            in_progress: count_status(TaskStatus::InProgress),
            pending: count_status(TaskStatus::Pending),
        },
        call_stats: CallStats {
            total,
            result_distribution,
        },
        tag_summaries,
        package,
    }
}

// ============================================
// Remaining stock
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StockWarning {
    pub is_low: bool,
    pub threshold: i64,
    pub message: Option<String>,
}

/// Leads not yet dialed, overall and by level
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemainingLeads {
    pub total_remaining: i64,
    pub by_level: BTreeMap<String, i64>,
    pub warning: StockWarning,
}

/// Remaining = valid leads minus calls already made, floored at 0 per package
pub fn remaining_leads(
    packages: &[LeadPackage],
    tasks: &[DialTask],
    threshold: i64,
) -> RemainingLeads {
    let called = calls_per_package(tasks);
    let mut by_level: BTreeMap<String, i64> = BTreeMap::new();
    let mut total_remaining = 0;

    for package in packages {
        let used = called.get(&package.id).copied().unwrap_or(0);
        let remaining = (i64::from(package.valid_leads) - used).max(0);
        *by_level.entry(level_key(package)).or_insert(0) += remaining;
        total_remaining += remaining;
    }

    let is_low = total_remaining < threshold;

    RemainingLeads {
        total_remaining,
        by_level,
        warning: StockWarning {
            is_low,
            threshold,
            message: is_low.then(|| "Remaining lead stock is low, plan a purchase".to_string()),
        },
    }
}

// ============================================
// Monthly consumption
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConsumptionPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days_passed: i64,
    pub days_in_month: i64,
}

/// Leads consumed (dialed) in the current month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthConsumption {
    pub total_consumption: i64,
    pub by_level: BTreeMap<String, i64>,
    pub daily_average: f64,
    pub projected_month_total: f64,
    pub period: ConsumptionPeriod,
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

fn starts_within(task: &DialTask, from: NaiveDate, until: NaiveDate) -> bool {
    task.start_time
        .map(|start| start.date_naive())
        .is_some_and(|start| from <= start && start < until)
}

/// Calls made by tasks started this month, the daily average so far and the
/// projected total for the whole month
pub fn month_consumption(
    packages: &[LeadPackage],
    tasks: &[DialTask],
    today: NaiveDate,
) -> MonthConsumption {
    let first_day = first_of_month(today);
    let next_month = first_of_next_month(today);
    let packages_by_id: HashMap<i32, &LeadPackage> =
        packages.iter().map(|p| (p.id, p)).collect();

    let mut by_level: BTreeMap<String, i64> = BTreeMap::new();
    let mut total_consumption = 0;

    for task in tasks
        .iter()
        .filter(|t| starts_within(t, first_day, next_month))
    {
        let Some(package) = packages_by_id.get(&task.package_id) else {
            continue;
        };
        *by_level.entry(level_key(package)).or_insert(0) += i64::from(task.total_calls);
        total_consumption += i64::from(task.total_calls);
    }

    let days_passed = (today - first_day).num_days() + 1;
    let days_in_month = (next_month - first_day).num_days();
    let daily_average = total_consumption as f64 / days_passed as f64;

    MonthConsumption {
        total_consumption,
        by_level,
        daily_average: round_to(daily_average, 2),
        projected_month_total: round_to(daily_average * days_in_month as f64, 0),
        period: ConsumptionPeriod {
            start_date: first_day,
            end_date: today,
            days_passed,
            days_in_month,
        },
    }
}

// ============================================
// Package progress
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageProgressEntry {
    pub id: i32,
    pub name: String,
    pub industry: Option<String>,
    pub total_leads: i32,
    pub valid_leads: i32,
    pub called: i64,
    pub remaining: i64,
    /// Percent of valid leads already dialed
    pub progress_rate: f64,
    /// Percent
    pub contact_rate: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressSummary {
    pub total_packages: usize,
    pub avg_progress: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageProgress {
    pub packages: Vec<PackageProgressEntry>,
    pub summary: ProgressSummary,
}

/// Dialing progress per package, newest package first
pub fn package_progress(packages: &[LeadPackage], tasks: &[DialTask]) -> PackageProgress {
    let called = calls_per_package(tasks);

    let mut ordered: Vec<&LeadPackage> = packages.iter().collect();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let mut total_progress = 0.0;
    let entries: Vec<PackageProgressEntry> = ordered
        .into_iter()
        .map(|package| {
            let calls = called.get(&package.id).copied().unwrap_or(0);
            let progress_rate = if package.valid_leads > 0 {
                calls as f64 / f64::from(package.valid_leads) * 100.0
            } else {
                0.0
            };
            total_progress += progress_rate;

            PackageProgressEntry {
                id: package.id,
                name: package.name.clone(),
                industry: package.industry.clone(),
                total_leads: package.total_leads,
                valid_leads: package.valid_leads,
                called: calls,
                remaining: (i64::from(package.valid_leads) - calls).max(0),
                progress_rate: round_to(progress_rate, 2),
                contact_rate: round_to(package.contact_rate * 100.0, 2),
                created_at: package.created_at,
            }
        })
        .collect();

    let avg_progress = if entries.is_empty() {
        0.0
    } else {
        total_progress / entries.len() as f64
    };

    PackageProgress {
        summary: ProgressSummary {
            total_packages: entries.len(),
            avg_progress: round_to(avg_progress, 2),
        },
        packages: entries,
    }
}

// ============================================
// Contact rate by level
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LevelContact {
    pub total_calls: i64,
    pub connected_calls: i64,
    /// Percent
    pub contact_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyContact {
    pub date: NaiveDate,
    /// Percent
    pub contact_rate: f64,
    pub total_calls: i64,
    pub connected_calls: i64,
}

/// Contact rates from task counters, overall and by level, plus a daily trend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectRateAnalysis {
    pub overall_rate: f64,
    pub by_level: BTreeMap<String, LevelContact>,
    pub total_calls: i64,
    pub total_connected: i64,
    #[serde(rename = "trend_7days")]
    pub trend: Vec<DailyContact>,
}

fn percent(numerator: i64, denominator: i64) -> f64 {
    round_to(
        ratio(numerator.max(0) as usize, denominator.max(0) as usize) * 100.0,
        2,
    )
}

/// Contact rate per level from task counters, with a trend of tasks started
/// within the last [`CONNECT_TREND_DAYS`] days bucketed by start date
pub fn connect_rate_analysis(
    packages: &[LeadPackage],
    tasks: &[DialTask],
    today: NaiveDate,
) -> ConnectRateAnalysis {
    let mut by_level: BTreeMap<String, LevelContact> = BTreeMap::new();
    let mut total_calls = 0;
    let mut total_connected = 0;

    for package in packages {
        let own = tasks.iter().filter(|t| t.package_id == package.id);
        let (calls, connected) = own.fold((0i64, 0i64), |(calls, connected), t| {
            (
                calls + i64::from(t.total_calls),
                connected + i64::from(t.connected_calls),
            )
        });

        let level = by_level.entry(level_key(package)).or_insert(LevelContact {
            total_calls: 0,
            connected_calls: 0,
            contact_rate: 0.0,
        });
        level.total_calls += calls;
        level.connected_calls += connected;

        total_calls += calls;
        total_connected += connected;
    }

    for level in by_level.values_mut() {
        level.contact_rate = percent(level.connected_calls, level.total_calls);
    }

    let since = today - Duration::days(CONNECT_TREND_DAYS);
    let mut daily: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    for task in tasks {
        let Some(start) = task.start_time.map(|s| s.date_naive()) else {
            continue;
        };
        if start < since {
            continue;
        }
        let bucket = daily.entry(start).or_insert((0, 0));
        bucket.0 += i64::from(task.total_calls);
        bucket.1 += i64::from(task.connected_calls);
    }

    let trend = daily
        .into_iter()
        .map(|(date, (calls, connected))| DailyContact {
            date,
            contact_rate: percent(connected, calls),
            total_calls: calls,
            connected_calls: connected,
        })
        .collect();

    ConnectRateAnalysis {
        overall_rate: percent(total_connected, total_calls),
        by_level,
        total_calls,
        total_connected,
        trend,
    }
}
