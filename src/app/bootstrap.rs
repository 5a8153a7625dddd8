use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use dotenv::dotenv;
use tracing::{error, info, warn};

use crate::app_config::cli::{Cli, Command};
use crate::app_config::log::setup_logging;
use crate::app_config::NewsSettings;
use crate::domain::EconomicEvent;
use crate::infrastructure::repositories::{NewsRepository, SqliteShardStore};
use crate::job::NewsDownloadJob;
use crate::services::{NewsFilter, NewsStats, VolatilitySelection};
use crate::time_util::{self, SECONDS_IN_DAY};

/// 应用初始化：加载 .env，设置日志
pub fn app_init() -> anyhow::Result<()> {
    dotenv().ok();
    setup_logging()?;
    Ok(())
}

/// 执行子命令
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Download {
            path_json,
            path_database,
            nodayoff,
        } => download(path_json.as_deref(), path_database, nodayoff).await,
        Command::Stats {
            path_database,
            output,
        } => stats(path_database, output.as_deref()).await,
        Command::Check {
            path_database,
            pair,
            past,
            future,
            low,
            moderate,
            high,
            only_selected,
            step,
        } => {
            let selection = VolatilitySelection::new(low, moderate, high).only_selected(only_selected);
            check(path_database, &pair, past, future, selection, step).await
        }
        Command::Show {
            path_database,
            date,
        } => show(path_database, &date).await,
    }
}

fn open_repository(path_database: Option<String>) -> anyhow::Result<NewsRepository> {
    let mut settings = NewsSettings::from_env();
    settings.apply_cli(path_database, false);
    let db_path = settings.database_path()?;
    let store = SqliteShardStore::open(&db_path)?;
    Ok(NewsRepository::new(Arc::new(store)))
}

async fn download(
    path_json: Option<&Path>,
    path_database: Option<String>,
    nodayoff: bool,
) -> anyhow::Result<()> {
    let mut settings = NewsSettings::load(path_json)?;
    settings.apply_cli(path_database, nodayoff);
    info!(
        "数据库: {}, 下载休息日: {}",
        settings.database_path()?.display(),
        settings.use_day_off
    );

    let job = NewsDownloadJob::from_settings(settings)?;
    let report = job.run().await?;
    println!(
        "data download completed: {} day(s) written, {} day(s) already stored, {} news",
        report.days_written, report.days_existing, report.events_written
    );
    Ok(())
}

async fn stats(path_database: Option<String>, output: Option<&Path>) -> anyhow::Result<()> {
    let repo = open_repository(path_database)?;
    let names = NewsStats::unique_names(&repo).await?;
    let text = NewsStats::render(&names);
    print!("{}", text);
    if let Some(path) = output {
        std::fs::write(path, &text)?;
        info!("统计结果已写入: {}", path.display());
    }
    Ok(())
}

async fn check(
    path_database: Option<String>,
    pair: &str,
    past: i64,
    future: i64,
    selection: VolatilitySelection,
    step: i64,
) -> anyhow::Result<()> {
    let repo = open_repository(path_database)?;
    let (min_day, max_day) = repo
        .min_max_timestamp()
        .await?
        .ok_or_else(|| anyhow!("news store is empty"))?;
    println!(
        "date: {} - {}",
        time_util::format_date(min_day),
        time_util::format_date(max_day)
    );

    let filter = NewsFilter::new(repo);
    // 顺序扫描，预加载后面一周
    filter.set_indent(0, 7).await;

    let range = (min_day, max_day + SECONDS_IN_DAY - 1);
    match filter.scan_first(pair, range, step, past, future, selection).await {
        Ok(Some(t)) => {
            println!("news found for {} at {}", pair, time_util::format_date_time(t));
            Ok(())
        }
        Ok(None) => {
            warn!("{} 在存储范围内没有匹配的新闻", pair);
            println!("no news found for {}", pair);
            Ok(())
        }
        Err(e) => {
            error!("❌ 新闻扫描失败: {}", e);
            Err(e.into())
        }
    }
}

async fn show(path_database: Option<String>, date: &str) -> anyhow::Result<()> {
    let day = time_util::parse_date(date).ok_or_else(|| anyhow!("invalid date '{}', expected YYYY-MM-DD", date))?;
    let repo = open_repository(path_database)?;
    let events = repo.read_news(day).await?.unwrap_or_default();
    println!("{}: {} news", time_util::format_date(day), events.len());
    for (i, event) in events.iter().enumerate() {
        print_event(i, event);
    }
    Ok(())
}

fn print_event(index: usize, event: &EconomicEvent) {
    println!("news: {}", index);
    println!("{}", time_util::format_date_time(event.timestamp));
    println!("name: {}", event.name);
    println!("currency: {}", event.currency);
    println!("country: {}", event.country);
    println!("volatility: {}", event.volatility.as_str());
    if let Some(v) = event.previous {
        println!("previous: {}", v);
    }
    if let Some(v) = event.actual {
        println!("actual: {}", v);
    }
    if let Some(v) = event.forecast {
        println!("forecast: {}", v);
    }
}
