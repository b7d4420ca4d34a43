//! Leadtrack CLI - Lead package metrics
//!
//! Registers lead packages, dial tasks and calls, recomputes the derived
//! figures stored on them, and prints dashboard and trend reports.

mod adapters;
mod application;
mod config;
mod output;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::Confirm;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use adapters::{PgCallRepository, PgMetricsRepository, PgPackageRepository, PgTaskRepository};
use application::{AnalyticsService, MetricsService, PackageService, TaskService};
use config::Config;
use leadtrack::domain::{parse_date, parse_datetime};
use leadtrack::{
    Call, CallResult, DateRange, DialTask, DialTaskChanges, LeadPackage, LeadPackageChanges,
    NewCall, NewCallTag, NewDialTask, NewLeadPackage, PackageCallStats, PackageFilter,
    PageRequest, TaskStatus, TrendPoint,
};
use output::{percent, Envelope};

#[derive(Parser)]
#[command(name = "leadtrack")]
#[command(about = "Leadtrack CLI - Lead package metrics", long_about = None)]
#[command(version)]
struct Cli {
    /// Print a JSON envelope instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lead packages
    Package {
        #[command(subcommand)]
        action: PackageAction,
    },

    /// Dial tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Daily summaries
    Summary {
        #[command(subcommand)]
        action: SummaryAction,
    },

    /// Daily trend series (defaults to the configured number of days ending today)
    Trends {
        /// Number of days ending today
        #[arg(
            short,
            long,
            conflicts_with_all = ["start", "end"],
            value_parser = clap::value_parser!(u32).range(1..=3660)
        )]
        days: Option<u32>,
        /// First day (YYYY-MM-DD)
        #[arg(long, value_parser = date_arg, requires = "end")]
        start: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD)
        #[arg(long, value_parser = date_arg, requires = "start")]
        end: Option<NaiveDate>,
    },

    /// Package tag summaries
    Tags {
        #[command(subcommand)]
        action: TagsAction,
    },

    /// Headline numbers and newest packages
    Dashboard,

    /// Lead stock and calling progress
    Data {
        #[command(subcommand)]
        action: DataAction,
    },

    /// Show current configuration
    Config {
        /// Write the effective configuration to the config file
        #[arg(long)]
        init: bool,
    },
}

#[derive(Subcommand)]
enum PackageAction {
    /// List packages, newest first
    List {
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[arg(long)]
        region: Option<String>,
        #[arg(short, long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Show one package
    Show { id: i32 },
    /// Register a package
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        source: String,
        /// Industry or grade level
        #[arg(long)]
        industry: Option<String>,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        total_leads: i32,
        #[arg(long)]
        valid_leads: i32,
        #[arg(long, default_value_t = 0.0)]
        cost_per_lead: f64,
    },
    /// Edit a package and re-derive its metrics
    Update {
        id: i32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        industry: Option<String>,
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        total_leads: Option<i32>,
        #[arg(long)]
        valid_leads: Option<i32>,
        #[arg(long)]
        cost_per_lead: Option<f64>,
    },
    /// Delete a package with its tasks, calls and tag summaries
    Delete {
        id: i32,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Dial tasks of a package
    Tasks { id: i32 },
    /// Task, call and tag breakdown of a package
    Stats { id: i32 },
    /// Recompute total cost and contact rate
    Recompute {
        /// Package ID
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        id: Option<i32>,
        /// Recompute every package
        #[arg(long)]
        all: bool,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Show one task
    Show { id: i32 },
    /// Recount a task's calls
    Recompute { id: i32 },
    /// Schedule a task against a package
    Create {
        package_id: i32,
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// YYYY-MM-DDTHH:MM:SS (UTC) or RFC 3339
        #[arg(long, value_parser = datetime_arg)]
        start: Option<DateTime<Utc>>,
        #[arg(long, value_parser = datetime_arg)]
        end: Option<DateTime<Utc>>,
    },
    /// Edit a task
    Update {
        id: i32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = status_arg)]
        status: Option<TaskStatus>,
        #[arg(long, value_parser = datetime_arg)]
        start: Option<DateTime<Utc>>,
        #[arg(long, value_parser = datetime_arg)]
        end: Option<DateTime<Utc>>,
    },
    /// Delete a task with its calls
    Delete {
        id: i32,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List a task's calls, newest first
    Calls {
        id: i32,
        #[arg(long, value_parser = result_arg)]
        result: Option<CallResult>,
        #[arg(short, long)]
        page: Option<u32>,
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Record a call (and its tags) and recount the task
    RecordCall {
        task_id: i32,
        #[arg(long)]
        phone: String,
        /// Dial time, defaults to now
        #[arg(long, value_parser = datetime_arg)]
        time: Option<DateTime<Utc>>,
        /// Talk time in seconds
        #[arg(long, default_value_t = 0)]
        duration: i32,
        #[arg(long, value_parser = result_arg, default_value = "no_answer")]
        result: CallResult,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        customer: Option<String>,
        #[arg(long)]
        company: Option<String>,
        /// name=value, repeatable
        #[arg(long = "tag", value_parser = tag_arg)]
        tags: Vec<NewCallTag>,
    },
}

#[derive(Subcommand)]
enum SummaryAction {
    /// Compute and store the summary for a day (default today)
    Compute {
        #[arg(long, value_parser = date_arg)]
        date: Option<NaiveDate>,
    },
    /// List stored summaries, newest first
    List {
        #[arg(long, value_parser = date_arg)]
        start: Option<NaiveDate>,
        #[arg(long, value_parser = date_arg)]
        end: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
enum TagsAction {
    /// Rebuild tag summaries
    Recompute {
        /// Package ID
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        package_id: Option<i32>,
        /// Rebuild for every package
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum DataAction {
    /// Leads not yet dialed
    Remaining,
    /// Leads consumed this month
    Consumption,
    /// Dialing progress per package
    Progress,
    /// Contact rate by level
    ConnectRate,
}

fn date_arg(value: &str) -> Result<NaiveDate, String> {
    parse_date(value).map_err(|e| e.to_string())
}

fn datetime_arg(value: &str) -> Result<DateTime<Utc>, String> {
    parse_datetime(value).map_err(|e| e.to_string())
}

fn result_arg(value: &str) -> Result<CallResult, String> {
    value.parse::<CallResult>().map_err(|e| e.to_string())
}

fn status_arg(value: &str) -> Result<TaskStatus, String> {
    value.parse::<TaskStatus>().map_err(|e| e.to_string())
}

fn tag_arg(value: &str) -> Result<NewCallTag, String> {
    value.parse::<NewCallTag>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // .env is optional
    let _ = dotenvy::dotenv();
    let config = Config::load()?;
    init_tracing(&config.log_level);

    let now = Utc::now();

    let json = cli.json;

    match cli.command {
        Commands::Package { action } => {
            let app = App::connect(&config).await?;
            cmd_package(&app, &config, action, now, json).await
        }
        Commands::Task { action } => {
            let app = App::connect(&config).await?;
            cmd_task(&app, &config, action, now, json).await
        }
        Commands::Summary { action } => {
            let app = App::connect(&config).await?;
            cmd_summary(&app, action, now, json).await
        }
        Commands::Trends { days, start, end } => {
            let app = App::connect(&config).await?;
            cmd_trends(&app, &config, days, start.zip(end), now, json).await
        }
        Commands::Tags { action } => {
            let app = App::connect(&config).await?;
            cmd_tags(&app, action, now, json).await
        }
        Commands::Dashboard => {
            let app = App::connect(&config).await?;
            cmd_dashboard(&app, &config, now, json).await
        }
        Commands::Data { action } => {
            let app = App::connect(&config).await?;
            cmd_data(&app, &config, action, now, json).await
        }
        Commands::Config { init } => cmd_config(&config, init, json),
    }
}

/// Log to stderr so stdout stays clean for `--json`
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// ============================================
// Wiring
// ============================================

type Packages = PackageService<PgPackageRepository, PgTaskRepository, PgCallRepository, PgMetricsRepository>;
type Metrics = MetricsService<PgPackageRepository, PgTaskRepository, PgCallRepository, PgMetricsRepository>;

struct App {
    packages: Packages,
    tasks: TaskService<PgTaskRepository, PgCallRepository>,
    metrics: Metrics,
    analytics: AnalyticsService<PgPackageRepository, PgTaskRepository>,
}

impl App {
    async fn connect(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(config.database_url()?)
            .await
            .context("Failed to connect to database")?;
        tracing::debug!(max_connections = config.max_connections, "Database pool ready");

        let packages = Arc::new(PgPackageRepository::new(pool.clone()));
        let tasks = Arc::new(PgTaskRepository::new(pool.clone()));
        let calls = Arc::new(PgCallRepository::new(pool.clone()));
        let metrics = Arc::new(PgMetricsRepository::new(pool));

        Ok(Self {
            packages: PackageService::new(
                packages.clone(),
                tasks.clone(),
                calls.clone(),
                metrics.clone(),
            ),
            tasks: TaskService::new(tasks.clone(), calls.clone(), config.interest_policy()),
            metrics: MetricsService::new(packages.clone(), tasks.clone(), calls, metrics),
            analytics: AnalyticsService::new(packages, tasks),
        })
    }
}

// ============================================
// Command Implementations
// ============================================

#[derive(Serialize)]
struct RecomputedPackage {
    package: LeadPackage,
    call_stats: PackageCallStats,
}

async fn cmd_package(
    app: &App,
    config: &Config,
    action: PackageAction,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    match action {
        PackageAction::List { source, industry, region, page, per_page } => {
            let filter = PackageFilter { source, industry, region };
            let request =
                PageRequest::new(page, per_page, config.default_page_size, config.max_page_size);
            let (packages, pagination) = app.packages.list(&filter, request).await?;

            if json {
                return Envelope::paginated(packages, pagination).print();
            }

            if packages.is_empty() {
                println!("No packages found.");
                return Ok(());
            }

            println!("{}", "Packages:".bold());
            for package in &packages {
                print_package_line(package);
            }
            println!(
                "\n{}",
                format!(
                    "Page {}/{} ({} packages)",
                    pagination.page,
                    pagination.pages.max(1),
                    pagination.total
                )
                .dimmed()
            );
        }

        PackageAction::Show { id } => {
            let package = app.packages.get(id).await?;
            if json {
                return Envelope::ok(package).print();
            }
            print_package_detail(&package);
        }

        PackageAction::Create {
            name,
            source,
            industry,
            region,
            total_leads,
            valid_leads,
            cost_per_lead,
        } => {
            let draft = NewLeadPackage {
                name,
                source,
                industry,
                region,
                total_leads,
                valid_leads,
                cost_per_lead,
            };
            let package = app.packages.create(draft, now).await?;
            if json {
                return Envelope::ok(package).print();
            }
            println!("{} Created package", "✓".green());
            print_package_detail(&package);
        }

        PackageAction::Update {
            id,
            name,
            source,
            industry,
            region,
            total_leads,
            valid_leads,
            cost_per_lead,
        } => {
            let changes = LeadPackageChanges {
                name,
                source,
                industry,
                region,
                total_leads,
                valid_leads,
                cost_per_lead,
            };
            let package = app.packages.update(id, changes, now).await?;
            if json {
                return Envelope::ok(package).print();
            }
            println!("{} Updated package", "✓".green());
            print_package_detail(&package);
        }

        PackageAction::Delete { id, yes } => {
            if !confirm(yes || json, &format!("Delete package {} and all of its calls?", id))? {
                println!("Aborted.");
                return Ok(());
            }
            app.packages.delete(id).await?;
            if json {
                return Envelope::ok(serde_json::json!({ "id": id })).print();
            }
            println!("{} Deleted package {}", "✓".green(), id);
        }

        PackageAction::Tasks { id } => {
            let tasks = app.packages.tasks(id).await?;
            if json {
                return Envelope::ok(tasks).print();
            }
            if tasks.is_empty() {
                println!("No tasks found.");
                return Ok(());
            }
            println!("{}", "Tasks:".bold());
            for task in &tasks {
                print_task_line(task);
            }
        }

        PackageAction::Stats { id } => {
            let stats = app.packages.stats(id).await?;
            if json {
                return Envelope::ok(stats).print();
            }

            print_package_detail(&stats.package);
            let tasks = &stats.task_stats;
            println!(
                "\n{} {} total, {} completed, {} in progress, {} pending",
                "Tasks:".bold(),
                tasks.total,
                tasks.completed.to_string().green(),
                tasks.in_progress.to_string().yellow(),
                tasks.pending
            );
            println!("{} {}", "Calls:".bold(), stats.call_stats.total);
            for (result, count) in &stats.call_stats.result_distribution {
                println!("  {:<12} {}", result.to_string().cyan(), count);
            }
            if !stats.tag_summaries.is_empty() {
                println!("{}", "Tags:".bold());
                for tag in &stats.tag_summaries {
                    println!(
                        "  {}={} {} ({})",
                        tag.tag_name.cyan(),
                        tag.tag_value.as_deref().unwrap_or("-"),
                        tag.tag_count,
                        percent(tag.percentage)
                    );
                }
            }
        }

        PackageAction::Recompute { id, all, yes } => {
            let results = if all {
                if !confirm(yes || json, "Recompute metrics for every package?")? {
                    println!("Aborted.");
                    return Ok(());
                }
                app.packages.recompute_all(now).await?
            } else {
                let id = id.context("Package ID required unless --all is given")?;
                vec![app.packages.recompute(id, now).await?]
            };

            if json {
                let data: Vec<RecomputedPackage> = results
                    .into_iter()
                    .map(|(package, call_stats)| RecomputedPackage { package, call_stats })
                    .collect();
                return Envelope::ok(data).print();
            }

            for (package, stats) in &results {
                let source = if stats.has_call_data {
                    format!("{}/{} calls connected", stats.connected_calls, stats.total_calls)
                } else {
                    "no calls".to_string()
                };
                println!(
                    "{} {} contact rate {} cost {:.2} ({})",
                    "✓".green(),
                    package.name.cyan(),
                    percent(package.contact_rate),
                    package.total_cost,
                    source.dimmed()
                );
            }
        }
    }

    Ok(())
}

async fn cmd_task(
    app: &App,
    config: &Config,
    action: TaskAction,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let task = match action {
        TaskAction::Show { id } => app.tasks.get(id).await?,
        TaskAction::Recompute { id } => app.tasks.recompute(id, now).await?,
        TaskAction::Create { package_id, name, description, start, end } => {
            let draft = NewDialTask {
                task_name: name,
                description,
                start_time: start,
                end_time: end,
            };
            app.packages.create_task(package_id, draft, now).await?
        }
        TaskAction::Update { id, name, description, status, start, end } => {
            let changes = DialTaskChanges {
                task_name: name,
                description,
                status,
                start_time: start,
                end_time: end,
            };
            app.tasks.update(id, changes, now).await?
        }

        TaskAction::Delete { id, yes } => {
            if !confirm(yes || json, &format!("Delete task {} and all of its calls?", id))? {
                println!("Aborted.");
                return Ok(());
            }
            app.tasks.delete(id).await?;
            if json {
                return Envelope::ok(serde_json::json!({ "id": id })).print();
            }
            println!("{} Deleted task {}", "✓".green(), id);
            return Ok(());
        }

        TaskAction::Calls { id, result, page, per_page } => {
            let request =
                PageRequest::new(page, per_page, config.default_page_size, config.max_page_size);
            let (calls, pagination) = app.tasks.list_calls(id, result, request).await?;

            if json {
                return Envelope::paginated(calls, pagination).print();
            }
            if calls.is_empty() {
                println!("No calls found.");
                return Ok(());
            }

            println!("{}", format!("Calls of task {}:", id).bold());
            for call in &calls {
                print_call_line(call);
            }
            println!(
                "\n{}",
                format!(
                    "Page {}/{} ({} calls)",
                    pagination.page,
                    pagination.pages.max(1),
                    pagination.total
                )
                .dimmed()
            );
            return Ok(());
        }

        TaskAction::RecordCall {
            task_id,
            phone,
            time,
            duration,
            result,
            notes,
            customer,
            company,
            tags,
        } => {
            let draft = NewCall {
                phone_number: phone,
                call_time: time,
                duration,
                result,
                notes,
                customer_name: customer,
                company,
            };
            let recorded = app.tasks.record_call(task_id, draft, tags, now).await?;

            if json {
                return Envelope::ok(recorded).print();
            }

            println!("{} Recorded call #{}", "✓".green(), recorded.call.id);
            print_call_line(&recorded.call);
            for tag in &recorded.tags {
                println!(
                    "    {}={}",
                    tag.tag_name.cyan(),
                    tag.tag_value.as_deref().unwrap_or("-")
                );
            }
            recorded.task
        }
    };

    if json {
        return Envelope::ok(task).print();
    }

    print_task_detail(&task);
    Ok(())
}

async fn cmd_summary(
    app: &App,
    action: SummaryAction,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    match action {
        SummaryAction::Compute { date } => {
            let date = date.unwrap_or_else(|| now.date_naive());
            let summary = app.metrics.compute_daily(date, now).await?;

            if json {
                return Envelope::ok(summary).print();
            }

            println!("{} Summary for {}", "✓".green(), summary.date.to_string().cyan());
            println!("  Packages: {} ({} new)", summary.total_packages, summary.new_packages);
            println!("  Leads: {}", summary.total_leads);
            println!(
                "  Calls: {} total, {} connected ({})",
                summary.total_calls,
                summary.connected_calls,
                percent(summary.avg_contact_rate)
            );
            println!("  Avg call duration: {}s", summary.avg_call_duration);
            println!("  Total cost: {:.2}", summary.total_cost);
        }

        SummaryAction::List { start, end } => {
            let summaries = app.metrics.list_summaries(start, end).await?;

            if json {
                return Envelope::ok(summaries).print();
            }

            if summaries.is_empty() {
                println!("No summaries found.");
                return Ok(());
            }

            println!("{}", "Daily summaries:".bold());
            for summary in &summaries {
                println!(
                    "  {} {:>6} calls {:>6} connected {:>8}",
                    summary.date.to_string().cyan(),
                    summary.total_calls,
                    summary.connected_calls,
                    percent(summary.avg_contact_rate)
                );
            }
        }
    }

    Ok(())
}

async fn cmd_trends(
    app: &App,
    config: &Config,
    days: Option<u32>,
    bounds: Option<(NaiveDate, NaiveDate)>,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let range = match bounds {
        Some((start, end)) => DateRange::new(start, end)?,
        None => DateRange::last_n_days(now.date_naive(), days.unwrap_or(config.trend_days))?,
    };
    let points = app.metrics.trends(range).await?;

    if json {
        return Envelope::ok(points).print();
    }

    println!("{} {} to {}", "Trend".bold(), range.start, range.end);
    for point in &points {
        print_trend_point(point);
    }

    Ok(())
}

async fn cmd_tags(app: &App, action: TagsAction, now: DateTime<Utc>, json: bool) -> Result<()> {
    let TagsAction::Recompute { package_id, all } = action;

    if all {
        let written = app.metrics.recompute_all_tag_summaries(now).await?;
        if json {
            let data: Vec<_> = written
                .iter()
                .map(|(id, rows)| serde_json::json!({ "package_id": id, "summaries": rows }))
                .collect();
            return Envelope::ok(data).print();
        }
        for (id, rows) in &written {
            println!("{} Package {}: {} tag summaries", "✓".green(), id, rows);
        }
        return Ok(());
    }

    let Some(package_id) = package_id else {
        bail!("Package ID required unless --all is given");
    };
    let rows = app.metrics.recompute_tag_summaries(package_id, now).await?;

    if json {
        return Envelope::ok(rows).print();
    }

    println!("{} Package {}: {} tag summaries", "✓".green(), package_id, rows.len());
    for row in &rows {
        println!(
            "  {}={} {} ({})",
            row.tag_name.cyan(),
            row.tag_value.as_deref().unwrap_or("-"),
            row.tag_count,
            percent(row.percentage)
        );
    }

    Ok(())
}

async fn cmd_dashboard(app: &App, config: &Config, now: DateTime<Utc>, json: bool) -> Result<()> {
    let overview = app
        .metrics
        .dashboard(now.date_naive(), config.recent_packages)
        .await?;

    if json {
        return Envelope::ok(overview).print();
    }

    let summary = &overview.summary;
    println!("{}", "Dashboard:".bold());
    println!("  Packages: {}", summary.total_packages);
    println!("  Leads: {}", summary.total_leads);
    println!("  Avg contact rate: {}", percent(summary.avg_contact_rate));
    println!("  Avg interest rate: {}", percent(summary.avg_interest_rate));
    println!(
        "  Today: {} calls, {} connected",
        summary.today_calls,
        summary.today_connected.to_string().green()
    );

    if !overview.recent_packages.is_empty() {
        println!("\n{}", "Recent packages:".bold());
        for package in &overview.recent_packages {
            print_package_line(package);
        }
    }

    Ok(())
}

async fn cmd_data(
    app: &App,
    config: &Config,
    action: DataAction,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let today = now.date_naive();

    match action {
        DataAction::Remaining => {
            let remaining = app.analytics.remaining(config.remaining_threshold).await?;
            if json {
                return Envelope::ok(remaining).print();
            }

            println!("{} {}", "Remaining leads:".bold(), remaining.total_remaining);
            for (level, count) in &remaining.by_level {
                println!("  {:<16} {}", level.cyan(), count);
            }
            if let Some(message) = &remaining.warning.message {
                println!("{} {}", "!".yellow(), message.yellow());
            }
        }

        DataAction::Consumption => {
            let consumption = app.analytics.consumption(today).await?;
            if json {
                return Envelope::ok(consumption).print();
            }

            let period = &consumption.period;
            println!(
                "{} {} to {} (day {}/{})",
                "Consumption".bold(),
                period.start_date,
                period.end_date,
                period.days_passed,
                period.days_in_month
            );
            println!("  Total: {}", consumption.total_consumption);
            for (level, count) in &consumption.by_level {
                println!("  {:<16} {}", level.cyan(), count);
            }
            println!("  Daily average: {:.2}", consumption.daily_average);
            println!("  Projected month total: {:.0}", consumption.projected_month_total);
        }

        DataAction::Progress => {
            let progress = app.analytics.progress().await?;
            if json {
                return Envelope::ok(progress).print();
            }

            println!(
                "{} {} packages, average {:.2}%",
                "Progress:".bold(),
                progress.summary.total_packages,
                progress.summary.avg_progress
            );
            for entry in &progress.packages {
                println!(
                    "  {} {:>7.2}% {} called, {} remaining",
                    entry.name.cyan(),
                    entry.progress_rate,
                    entry.called,
                    entry.remaining
                );
            }
        }

        DataAction::ConnectRate => {
            let analysis = app.analytics.connect_rate(today).await?;
            if json {
                return Envelope::ok(analysis).print();
            }

            println!(
                "{} {:.2}% ({}/{})",
                "Contact rate:".bold(),
                analysis.overall_rate,
                analysis.total_connected,
                analysis.total_calls
            );
            for (level, contact) in &analysis.by_level {
                println!(
                    "  {:<16} {:>6.2}% ({}/{})",
                    level.cyan(),
                    contact.contact_rate,
                    contact.connected_calls,
                    contact.total_calls
                );
            }
            if !analysis.trend.is_empty() {
                println!("{}", "Last 7 days:".bold());
                for day in &analysis.trend {
                    println!("  {} {:>6.2}%", day.date.to_string().dimmed(), day.contact_rate);
                }
            }
        }
    }

    Ok(())
}

fn cmd_config(config: &Config, init: bool, json: bool) -> Result<()> {
    if init {
        config.save()?;
        println!("{} Config written to {:?}", "✓".green(), Config::config_path()?);
        return Ok(());
    }

    if json {
        return Envelope::ok(config).print();
    }

    println!("{}", "Configuration:".bold());
    println!("  Path: {:?}", Config::config_path()?);
    println!(
        "  Database: {}",
        if config.database_url.is_some() { "Set".green() } else { "Not set".red() }
    );
    println!("  Log level: {}", config.log_level);
    println!("  Max connections: {}", config.max_connections);
    println!(
        "  Page size: {} (max {})",
        config.default_page_size, config.max_page_size
    );
    println!("  Remaining threshold: {}", config.remaining_threshold);
    println!("  Recent packages: {}", config.recent_packages);
    println!("  Trend days: {}", config.trend_days);
    println!(
        "  Interest tag: {} in [{}]",
        config.interest_tag.name.cyan(),
        config.interest_tag.values.join(", ")
    );

    Ok(())
}

// ============================================
// Text output helpers
// ============================================

/// Ask before a destructive or bulk command unless `skip` is set
fn confirm(skip: bool, prompt: &str) -> Result<bool> {
    if skip {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

fn print_task_line(task: &DialTask) {
    println!(
        "  {} {} [{}] {} calls, contact {}",
        format!("#{}", task.id).dimmed(),
        task.task_name.cyan().bold(),
        task.status,
        task.total_calls,
        percent(task.contact_rate())
    );
}

fn print_task_detail(task: &DialTask) {
    println!("{} {}", task.task_name.cyan().bold(), format!("#{}", task.id).dimmed());
    println!("  Package: {}", task.package_id);
    println!("  Status: {}", task.status);
    if let Some(description) = &task.description {
        println!("  Description: {}", description);
    }
    if let Some(start) = task.start_time {
        println!("  Start: {}", start.format("%Y-%m-%d %H:%M"));
    }
    if let Some(end) = task.end_time {
        println!("  End: {}", end.format("%Y-%m-%d %H:%M"));
    }
    println!(
        "  Calls: {} total, {} connected ({}), {} interested ({})",
        task.total_calls,
        task.connected_calls,
        percent(task.contact_rate()),
        task.interested_calls,
        percent(task.interest_rate())
    );
}

fn print_call_line(call: &Call) {
    let result = format!("{:<10}", call.result.to_string());
    let result = if call.result.is_connected() { result.green() } else { result.normal() };
    println!(
        "  {} {} {} {} {:.2} min {}",
        format!("#{}", call.id).dimmed(),
        call.call_time.format("%Y-%m-%d %H:%M"),
        call.phone_number,
        result,
        call.duration_minutes(),
        call.customer_name.as_deref().unwrap_or("").dimmed()
    );
}

fn print_package_line(package: &LeadPackage) {
    println!(
        "  {} {} [{}] {} leads, contact {}",
        format!("#{}", package.id).dimmed(),
        package.name.cyan().bold(),
        package.industry.as_deref().unwrap_or("-"),
        package.total_leads,
        percent(package.contact_rate)
    );
}

fn print_package_detail(package: &LeadPackage) {
    println!("{} {}", package.name.cyan().bold(), format!("#{}", package.id).dimmed());
    println!("  Source: {}", package.source);
    println!("  Industry: {}", package.industry.as_deref().unwrap_or("-"));
    println!("  Region: {}", package.region.as_deref().unwrap_or("-"));
    println!("  Leads: {} total, {} valid", package.total_leads, package.valid_leads);
    println!("  Contact rate: {}", percent(package.contact_rate));
    println!("  Interest rate: {}", percent(package.interest_rate));
    println!(
        "  Cost: {:.2} per lead, {:.2} total",
        package.cost_per_lead, package.total_cost
    );
    println!("  Created: {}", package.created_at.format("%Y-%m-%d %H:%M"));
}

fn print_trend_point(point: &TrendPoint) {
    let date = point.date.to_string();
    if point.is_placeholder {
        println!("  {} {}", date.dimmed(), "-".dimmed());
        return;
    }

    println!(
        "  {} {:>6} calls {:>6} connected {:>8} avg {}s",
        date.cyan(),
        point.total_calls,
        point.connected_calls,
        percent(point.avg_contact_rate),
        point.avg_call_duration
    );
}
