//! 查询流程集成测试：存储门面 → 滑动窗口缓存 → 过滤

use std::sync::Arc;

use approx::assert_relative_eq;
use tempfile::tempdir;

use forex_news::domain::{EconomicEvent, Volatility};
use forex_news::error::AppError;
use forex_news::infrastructure::repositories::{InMemoryShardStore, NewsRepository, SqliteShardStore};
use forex_news::services::{FilterState, NewsCache, NewsFilter, NewsStats, VolatilitySelection};
use forex_news::time_util::{SECONDS_IN_DAY, SECONDS_IN_HOUR};

// 2019-11-18 00:00:00 UTC
const DAY: i64 = 1574035200;

fn news(name: &str, currency: &str, volatility: Volatility, timestamp: i64) -> EconomicEvent {
    EconomicEvent::new(name, currency, "", volatility, timestamp).with_values(Some(0.1), Some(0.2), None)
}

async fn seeded_repo() -> (NewsRepository, InMemoryShardStore) {
    let store = InMemoryShardStore::new();
    let repo = NewsRepository::new(Arc::new(store.clone()));
    repo.write_news(
        &[
            news("German PPI", "EUR", Volatility::Low, DAY + 7 * SECONDS_IN_HOUR),
            news("Fed Chair Speaks", "USD", Volatility::High, DAY + 14 * SECONDS_IN_HOUR),
            news("BoJ Minutes", "JPY", Volatility::High, DAY + 16 * SECONDS_IN_HOUR),
        ],
        DAY,
    )
    .await
    .unwrap();
    let next = DAY + SECONDS_IN_DAY;
    repo.write_news(
        &[news("ECB Speech", "EUR", Volatility::Moderate, next + 9 * SECONDS_IN_HOUR)],
        next,
    )
    .await
    .unwrap();
    (repo, store)
}

#[tokio::test]
async fn test_eurusd_high_threshold_window() {
    let (repo, _) = seeded_repo().await;
    let filter = NewsFilter::new(repo);
    let fed = DAY + 14 * SECONDS_IN_HOUR;

    for (t, expected) in [
        (fed, FilterState::NewsFound),
        (fed - 1800, FilterState::NewsFound),
        (fed + 1800, FilterState::NewsFound),
        (fed - 1801, FilterState::NoNews),
        (fed + 1801, FilterState::NoNews),
        // 只有 JPY 高波动新闻
        (DAY + 16 * SECONDS_IN_HOUR, FilterState::NoNews),
        // EUR 低波动新闻不满足阈值
        (DAY + 7 * SECONDS_IN_HOUR, FilterState::NoNews),
    ] {
        let state = filter
            .filter_threshold("EURUSD", t, 1800, 1800, Volatility::High)
            .await
            .unwrap();
        assert_eq!(state, expected, "t = {}", t);
    }
}

#[tokio::test]
async fn test_invalid_pair_is_surfaced() {
    let (repo, _) = seeded_repo().await;
    let filter = NewsFilter::new(repo);
    let result = filter
        .filter_threshold("EU", DAY, 1800, 1800, Volatility::Low)
        .await;
    assert!(matches!(result, Err(AppError::InvalidParameter(_))));

    let state = filter
        .filter_threshold("frxEURUSD", DAY + 7 * SECONDS_IN_HOUR, 60, 60, Volatility::Low)
        .await
        .unwrap();
    assert_eq!(state, FilterState::NewsFound);
}

#[tokio::test]
async fn test_only_selected_rejects_other_severity() {
    let store = InMemoryShardStore::new();
    let repo = NewsRepository::new(Arc::new(store));
    let t = DAY + 12 * SECONDS_IN_HOUR;
    repo.write_news(
        &[
            news("Claims", "USD", Volatility::Low, t - 600),
            news("CPI", "USD", Volatility::High, t + 600),
        ],
        DAY,
    )
    .await
    .unwrap();
    let filter = NewsFilter::new(repo);

    let moderate_only = VolatilitySelection::new(false, true, false).only_selected(true);
    assert_eq!(
        filter.filter("EURUSD", t, 1800, 1800, moderate_only).await.unwrap(),
        FilterState::NoNews
    );

    let high = VolatilitySelection::new(false, false, true);
    assert!(filter.is_news("EURUSD", t, 1800, 1800, high).await);
    assert!(!filter.is_news("EURUSD", t, 1800, 1800, high.only_selected(true)).await);
    assert!(!filter.is_news("EU", t, 1800, 1800, high).await);
}

#[tokio::test]
async fn test_no_stored_data_is_not_found() {
    let filter = NewsFilter::new(NewsRepository::new(Arc::new(InMemoryShardStore::new())));
    let selection = VolatilitySelection::new(true, true, true);
    assert_eq!(
        filter.filter("EURUSD", DAY, 1800, 1800, selection).await.unwrap(),
        FilterState::NoNews
    );
}

#[tokio::test]
async fn test_sliding_window_reloads() {
    let (repo, store) = seeded_repo().await;
    let mut cache = NewsCache::new(repo);

    let first = cache.query(DAY + 14 * SECONDS_IN_HOUR, 3600, 3600).await.unwrap();
    assert_eq!(first.len(), 1);
    let reads = store.read_count();

    // 同一天内重叠的窗口命中缓存
    let again = cache.query(DAY + 15 * SECONDS_IN_HOUR, 3600, 3600).await.unwrap();
    assert_eq!(again.len(), 2);
    assert_eq!(cache.reload_count(), 1);
    assert_eq!(store.read_count(), reads);

    // 第二天触发一次重载
    let next = DAY + SECONDS_IN_DAY;
    let found = cache.query(next + 9 * SECONDS_IN_HOUR, 60, 60).await.unwrap();
    assert_eq!(found[0].name, "ECB Speech");
    assert_eq!(cache.reload_count(), 2);
    assert_eq!(cache.window(), Some((next, next)));
}

#[tokio::test]
async fn test_filter_reuses_cache_across_calls() {
    let (repo, _) = seeded_repo().await;
    let filter = NewsFilter::new(repo);
    let selection = VolatilitySelection::new(true, true, true);
    for minute in 0..120 {
        let t = DAY + 13 * SECONDS_IN_HOUR + minute * 60;
        filter.filter("EURUSD", t, 1200, 1200, selection).await.unwrap();
    }
    assert_eq!(filter.reload_count().await, 1);
}

#[tokio::test]
async fn test_sqlite_round_trip_keeps_presence_flags() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("storage").join("forexprostools-news.db");
    let events = vec![
        EconomicEvent::new("Trade Balance", "AUD", "Australia", Volatility::Moderate, DAY + 1800)
            .with_values(Some(-1.25), None, Some(0.0)),
        EconomicEvent::new("Holiday", "NZD", "New Zealand", Volatility::Unset, DAY + 3600),
    ];

    {
        let store = SqliteShardStore::open(&db_path).unwrap();
        let repo = NewsRepository::new(Arc::new(store));
        repo.write_news(&events, DAY + 5).await.unwrap();
        repo.save().await.unwrap();
    }

    let repo = NewsRepository::new(Arc::new(SqliteShardStore::open(&db_path).unwrap()));
    let loaded = repo.read_news(DAY).await.unwrap().unwrap();
    assert_eq!(loaded, events);
    assert_relative_eq!(loaded[0].previous.unwrap(), -1.25);
    assert_eq!(loaded[0].actual, None);
    assert_eq!(loaded[0].forecast, Some(0.0));
    assert_eq!(loaded[1].volatility, Volatility::Unset);
    assert_eq!(repo.min_max_timestamp().await.unwrap(), Some((DAY, DAY)));

    let names = NewsStats::unique_names(&repo).await.unwrap();
    assert_eq!(names.len(), 2);
}
