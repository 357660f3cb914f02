//! tubestats-wrapped - Channel Year in Review CLI
//!
//! Generate Wrapped-style summaries of a YouTube channel's year.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{FixedOffset, Utc};
use clap::Parser;
use tubestats_core::analytics::period::month_name;
use tubestats_core::analytics::{
    compute_annual_review_stats_with, AnnualReview, ReviewOptions, ReviewPeriod,
};
use tubestats_core::db::StoredReview;
use tubestats_core::format::{
    format_date_with_weekday, format_duration_hm, format_gmt_offset, format_local_datetime,
};
use tubestats_core::ingest::{load_videos, prepare_videos, SyncApiClient};
use tubestats_core::{parse_publish_date, Config, Database};

#[derive(Parser, Debug)]
#[command(name = "tubestats-wrapped")]
#[command(about = "Channel Wrapped - Your Year in Review")]
#[command(version)]
struct Args {
    /// Classified videos JSON file to read
    #[arg(long, conflicts_with = "saved")]
    input: Option<PathBuf>,

    /// Channel id (fetches from the API when no --input is given)
    #[arg(long)]
    channel: Option<String>,

    /// Year to generate the review for (default: current year)
    #[arg(long)]
    year: Option<i32>,

    /// Month to generate the review for (format: YYYY-MM)
    #[arg(long, conflicts_with = "year")]
    month: Option<String>,

    /// UTC offset in hours used for days and months (overrides config)
    #[arg(long, allow_hyphen_values = true)]
    utc_offset: Option<i32>,

    /// Export format (md = markdown, json = JSON)
    #[arg(long)]
    export: Option<String>,

    /// Save the generated review (requires --channel)
    #[arg(long, conflicts_with = "saved")]
    save: bool,

    /// Show the saved review for --channel and --year instead of computing one
    #[arg(long)]
    saved: bool,
}

/// Everything the printers need.
struct Report<'a> {
    period: ReviewPeriod,
    offset: FixedOffset,
    uncategorized_label: &'a str,
    review: &'a AnnualReview,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(hours) = args.utc_offset {
        config.review.utc_offset_hours = hours;
    }
    let _log_guard = tubestats_core::logging::init(&config.logging).ok();
    let offset = config.review.utc_offset().context("invalid UTC offset")?;

    let period = parse_period(&args, &offset)?;

    let review = if args.saved {
        let channel = args
            .channel
            .as_deref()
            .context("--saved requires --channel")?;
        let db = open_database()?;
        db.require_review(channel, period.year())
            .context("failed to load saved review")?
            .review
    } else {
        let videos = match (&args.input, &args.channel) {
            (Some(path), _) => load_videos(path)
                .with_context(|| format!("failed to load videos from {}", path.display()))?,
            (None, Some(channel)) => SyncApiClient::new(&config.api)
                .context("failed to create API client")?
                .fetch_classified(channel, period, &offset)
                .context("failed to fetch classified videos")?,
            (None, None) => anyhow::bail!("Either --input or --channel is required"),
        };

        let (videos, summary) = prepare_videos(videos, period, &config.review)
            .context("failed to prepare videos")?;
        if summary.undated > 0 {
            eprintln!(
                "Skipped {} video(s) with an unparseable publish date",
                summary.undated
            );
        }
        let review = compute_annual_review_stats_with(&videos, &ReviewOptions::with_offset(offset));

        if args.save {
            let channel = args.channel.as_deref().context("--save requires --channel")?;
            if matches!(period, ReviewPeriod::Month(..)) {
                anyhow::bail!("Only yearly reviews can be saved");
            }
            let db = open_database()?;
            db.upsert_review(&StoredReview {
                channel_id: channel.to_string(),
                year: period.year(),
                period_start: period.start(&offset),
                period_end: period.end(&offset),
                generated_at: Utc::now(),
                video_count: summary.kept as i64,
                review: review.clone(),
            })
            .context("failed to save review")?;
            eprintln!("Saved review for {} {}", channel, period.year());
        }

        review
    };

    let report = Report {
        period,
        offset,
        uncategorized_label: &config.review.uncategorized_label,
        review: &review,
    };

    // Output based on export format
    match args.export.as_deref() {
        Some("json") => print_json(&report)?,
        Some("md") => print_markdown(&report),
        Some(other) => anyhow::bail!("Unknown export format: {}. Use 'md' or 'json'", other),
        None => print_terminal(&report),
    }

    Ok(())
}

fn parse_period(args: &Args, offset: &FixedOffset) -> Result<ReviewPeriod> {
    if let Some(month_str) = &args.month {
        // Parse YYYY-MM format
        let (year, month) = month_str
            .split_once('-')
            .context("Invalid month format. Use YYYY-MM (e.g., 2024-12)")?;
        let year = check_year(year.parse().context("Invalid year")?)?;
        let month: u32 = month.parse().context("Invalid month")?;
        if !(1..=12).contains(&month) {
            anyhow::bail!("Month must be between 1 and 12");
        }
        Ok(ReviewPeriod::Month(year, month))
    } else if let Some(year) = args.year {
        Ok(ReviewPeriod::Year(check_year(year)?))
    } else {
        Ok(ReviewPeriod::current_year(offset))
    }
}

fn check_year(year: i32) -> Result<i32> {
    if !(1..=9999).contains(&year) {
        anyhow::bail!("Year must be between 1 and 9999");
    }
    Ok(year)
}

fn open_database() -> Result<Database> {
    let db = Database::open(&Config::database_path()).context("failed to open database")?;
    db.migrate().context("failed to run migrations")?;
    Ok(db)
}

/// Publish time of a stream in the review offset, or the raw value.
fn stream_time(publish_date: &str, offset: &FixedOffset) -> String {
    parse_publish_date(publish_date)
        .map(|ts| format_local_datetime(ts, offset))
        .unwrap_or_else(|| publish_date.to_string())
}

fn print_terminal(report: &Report<'_>) {
    let stats = &report.review.stats;
    let special = &report.review.special;
    let title = format!(
        "YOUR {} CHANNEL WRAPPED ({})",
        report.period.display_name(),
        format_gmt_offset(&report.offset)
    );

    // Header
    println!();
    println!("╭{}╮", "─".repeat(60));
    println!("│{:^60}│", title);
    println!("╰{}╯", "─".repeat(60));
    println!();

    if stats.video_counts.total() == 0 {
        println!("  No videos found for this period.");
        println!();
        return;
    }

    println!("THE NUMBERS");
    println!(
        "   Videos: {:<12} Shorts: {:<12} Live: {}",
        stats.video_counts.videos, stats.video_counts.shorts, stats.video_counts.live
    );
    println!(
        "   Live hours: {:<8} Live days: {} of {}",
        stats.total_live_hours,
        stats.total_live_days,
        report.period.total_days()
    );
    println!();

    println!("BY MONTH");
    for month in &stats.monthly_video_counts {
        let counts = &month.counts;
        if counts.total() == 0 {
            continue;
        }
        println!(
            "   {:<10} videos {:>3}  shorts {:>3}  live {:>3}",
            month_name(month.month),
            counts.videos,
            counts.shorts,
            counts.live
        );
    }
    println!();

    let ratios = stats.category_ratio(report.uncategorized_label);
    if !ratios.is_empty() {
        println!("LIVE TIME BY CATEGORY");
        for ratio in ratios.iter().take(10) {
            println!(
                "   {:<24} {:>7.1}h  {:>5.1}%",
                ratio.category, ratio.hours, ratio.percentage
            );
        }
        println!();
    }

    println!("HIGHLIGHTS");
    if let Some(live) = &special.longest_live {
        println!(
            "   Longest stream: {} ({}) on {}",
            live.title,
            format_duration_hm(live.duration),
            stream_time(&live.publish_date, &report.offset)
        );
    }
    if let Some(streak) = &special.longest_live_streak {
        println!(
            "   Longest streak: {} days, {} to {} ({} live)",
            streak.days,
            format_date_with_weekday(streak.start_date),
            format_date_with_weekday(streak.end_date),
            format_duration_hm(streak.total_duration)
        );
    }
    if let Some(month) = &special.most_active_month {
        println!(
            "   Busiest month: {} ({})",
            month_name(month.month),
            format_duration_hm(month.total_duration)
        );
    }
    for (rank, share) in [("Top", &special.top_game), ("Runner-up", &special.second_top_game)] {
        if let Some(share) = share {
            println!(
                "   {} category: {} - {}%  ({})",
                rank,
                share.category,
                share.percentage,
                format_duration_hm(share.total_duration)
            );
        }
    }
    println!("   Categories streamed: {}", special.distinct_game_count);
    println!();
}

fn print_markdown(report: &Report<'_>) {
    let stats = &report.review.stats;
    let special = &report.review.special;

    println!(
        "# {} Channel Wrapped ({})",
        report.period.display_name(),
        format_gmt_offset(&report.offset)
    );
    println!();

    if stats.video_counts.total() == 0 {
        println!("*No videos found for this period.*");
        return;
    }

    // Summary table
    println!("## Summary");
    println!();
    println!("| Metric | Value |");
    println!("|--------|-------|");
    println!("| Videos | {} |", stats.video_counts.videos);
    println!("| Shorts | {} |", stats.video_counts.shorts);
    println!("| Live streams | {} |", stats.video_counts.live);
    println!("| Live hours | {} |", stats.total_live_hours);
    println!(
        "| Live days | {} of {} |",
        stats.total_live_days,
        report.period.total_days()
    );
    println!();

    println!("## By Month");
    println!();
    println!("| Month | Videos | Shorts | Live |");
    println!("|-------|--------|--------|------|");
    for month in &stats.monthly_video_counts {
        println!(
            "| {} | {} | {} | {} |",
            month_name(month.month),
            month.counts.videos,
            month.counts.shorts,
            month.counts.live
        );
    }
    println!();

    let ratios = stats.category_ratio(report.uncategorized_label);
    if !ratios.is_empty() {
        println!("## Live Time by Category");
        println!();
        println!("| Category | Hours | Share |");
        println!("|----------|-------|-------|");
        for ratio in &ratios {
            println!(
                "| {} | {:.1} | {:.1}% |",
                ratio.category, ratio.hours, ratio.percentage
            );
        }
        println!();
    }

    println!("## Highlights");
    println!();
    if let Some(live) = &special.longest_live {
        println!(
            "- **Longest stream:** {} - {} on {}",
            live.title,
            format_duration_hm(live.duration),
            stream_time(&live.publish_date, &report.offset)
        );
    }
    if let Some(streak) = &special.longest_live_streak {
        println!(
            "- **Longest streak:** {} days ({} to {})",
            streak.days,
            format_date_with_weekday(streak.start_date),
            format_date_with_weekday(streak.end_date)
        );
        for item in &streak.items {
            println!(
                "  - {} - {}",
                stream_time(&item.publish_date, &report.offset),
                item.title
            );
        }
    }
    if let Some(month) = &special.most_active_month {
        println!(
            "- **Busiest month:** {} ({})",
            month_name(month.month),
            format_duration_hm(month.total_duration)
        );
    }
    if let Some(top) = &special.top_game {
        println!("- **Top category:** {} ({}%)", top.category, top.percentage);
    }
    if let Some(second) = &special.second_top_game {
        println!(
            "- **Runner-up category:** {} ({}%)",
            second.category, second.percentage
        );
    }
    if !special.distinct_game_list.is_empty() {
        println!(
            "- **Categories streamed ({}):** {}",
            special.distinct_game_count,
            special.distinct_game_list.join(", ")
        );
    }
    println!();

    println!("---");
    println!("*Generated by tubestats-wrapped*");
}

fn print_json(report: &Report<'_>) -> Result<()> {
    let json = serde_json::json!({
        "period": report.period.display_name(),
        "utcOffset": format_gmt_offset(&report.offset),
        "stats": report.review.stats,
        "special": report.review.special,
        "categoryRatio": report
            .review
            .stats
            .category_ratio(report.uncategorized_label)
            .iter()
            .map(|r| serde_json::json!({
                "category": r.category,
                "hours": r.hours,
                "percentage": r.percentage,
            }))
            .collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
