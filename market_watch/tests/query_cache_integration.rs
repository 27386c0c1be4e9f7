//! Integration tests for the query cache: staleness, retries, errors and resets.

use market_watch::{
    ApiError, ErrorCode, QueryClient, QueryKey, QueryOptions,
    query::{CompositeStatus, QueryStatus, Selector},
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::time::{advance, sleep};

fn options() -> QueryOptions {
    QueryOptions::default()
        .with_stale_time(Duration::from_secs(60))
        .with_retry(1, Duration::from_millis(100))
}

/// Fetcher returning the call number, after `delay`
fn counting(
    calls: &Arc<AtomicUsize>,
    delay: Duration,
) -> impl Fn() -> std::pin::Pin<Box<dyn Future<Output = Result<usize, ApiError>> + Send>>
+ Send
+ Sync
+ 'static {
    let calls = calls.clone();
    move || {
        let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
        Box::pin(async move {
            sleep(delay).await;
            Ok(n)
        })
    }
}

fn failing(
    calls: &Arc<AtomicUsize>,
) -> impl Fn() -> std::pin::Pin<Box<dyn Future<Output = Result<usize, ApiError>> + Send>>
+ Send
+ Sync
+ 'static {
    let calls = calls.clone();
    move || {
        calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Err(ApiError::new(ErrorCode::NetworkError, "backend down")) })
    }
}

#[tokio::test(start_paused = true)]
async fn test_back_to_back_reads_make_one_call() {
    let cache = QueryClient::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = QueryKey::new("rates");

    let first = cache.query(&key, options(), counting(&calls, Duration::ZERO)).await;
    let second = cache.query(&key, options(), counting(&calls, Duration::ZERO)).await;

    assert_eq!(first.data().copied(), Some(1));
    assert_eq!(second.data().copied(), Some(1));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stale_data_served_while_refetching() {
    let cache = QueryClient::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = QueryKey::new("rates");
    let opts = options().with_stale_time(Duration::from_secs(1));

    cache.query(&key, opts.clone(), counting(&calls, Duration::from_millis(50))).await;
    advance(Duration::from_secs(2)).await;

    let stale = cache
        .query(&key, opts.clone(), counting(&calls, Duration::from_millis(50)))
        .await;
    assert_eq!(stale.data().copied(), Some(1));
    assert!(stale.is_stale);
    assert!(stale.is_fetching);
    assert!(!stale.is_loading);

    sleep(Duration::from_millis(100)).await;
    let refreshed = cache.snapshot::<usize>(&key).await;
    assert_eq!(refreshed.data().copied(), Some(2));
    assert!(!refreshed.is_stale);
    assert!(!refreshed.is_fetching);
}

#[tokio::test(start_paused = true)]
async fn test_invalidate_all_forces_refetch() {
    let cache = QueryClient::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = QueryKey::new("rates");

    cache.query(&key, options(), counting(&calls, Duration::ZERO)).await;
    cache.invalidate_all().await;
    assert!(cache.is_empty().await);

    let state = cache.query(&key, options(), counting(&calls, Duration::ZERO)).await;
    assert_eq!(state.data().copied(), Some(2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_in_flight_at_reset_does_not_write_back() {
    let cache = QueryClient::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = QueryKey::new("rates");

    let reader = tokio::spawn({
        let cache = cache.clone();
        let key = key.clone();
        let fetcher = counting(&calls, Duration::from_secs(1));
        async move { cache.query(&key, options(), fetcher).await }
    });
    tokio::task::yield_now().await;
    assert!(cache.snapshot::<usize>(&key).await.is_loading);

    cache.invalidate_all().await;
    let state = reader.await.unwrap();

    // The caller still sees its own result...
    assert_eq!(state.data().copied(), Some(1));
    // ...but the reset cache never received it.
    assert!(cache.is_empty().await);
    assert!(cache.get_query_data::<usize>(&key).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_retry_then_success() {
    let cache = QueryClient::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();

    let state = cache
        .query(&QueryKey::new("flaky"), options(), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(ApiError::new(ErrorCode::TimeoutError, "timeout of 10000ms exceeded"))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

    assert!(state.is_success());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn test_errored_entry_waits_for_explicit_trigger() {
    let cache = QueryClient::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = QueryKey::new("rates");

    let state = cache.query(&key, options(), failing(&calls)).await;
    assert!(state.is_error);
    assert_eq!(state.error.unwrap().code, ErrorCode::NetworkError);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // A plain re-read reports the error without another attempt.
    let again = cache.query(&key, options(), failing(&calls)).await;
    assert!(again.is_error);
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    cache.invalidate("rates").await;
    cache.query::<usize, _, _>(&key, options(), failing(&calls)).await;
    assert_eq!(calls.load(Ordering::SeqCst), 4);

    let retried = cache.refetch::<usize>(&key).await;
    assert!(retried.is_error);
    assert_eq!(calls.load(Ordering::SeqCst), 6);
}

#[tokio::test(start_paused = true)]
async fn test_failures_are_isolated_per_key() {
    let cache = QueryClient::new();
    let good_calls = Arc::new(AtomicUsize::new(0));
    let bad_calls = Arc::new(AtomicUsize::new(0));

    let good_key = QueryKey::new("good");
    let bad_key = QueryKey::new("bad");
    let (good, bad) = tokio::join!(
        cache.query(&good_key, options(), counting(&good_calls, Duration::ZERO)),
        cache.query(&bad_key, options(), failing(&bad_calls)),
    );

    assert!(good.is_success());
    assert!(bad.is_error);
    let status = CompositeStatus::from_parts([&good as &dyn QueryStatus, &bad]);
    assert!(status.is_error);
    assert!(!status.is_loading);
    assert_eq!(status.error.unwrap().message, "backend down");
}

#[tokio::test(start_paused = true)]
async fn test_parameterized_keys_are_independent() {
    let cache = QueryClient::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let january = QueryKey::new("interestRates").with("202401");
    let february = QueryKey::new("interestRates").with("202402");
    cache.query(&january, options(), counting(&calls, Duration::ZERO)).await;
    cache.query(&february, options(), counting(&calls, Duration::ZERO)).await;
    cache.query(&january, options(), counting(&calls, Duration::ZERO)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.invalidate("interestRates").await, 2);
}

#[tokio::test(start_paused = true)]
async fn test_selector_follows_refetches() {
    let cache = QueryClient::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let key = QueryKey::new("rates");
    let mut doubled = Selector::new(|n: &usize| n * 2);

    let first = cache.query(&key, options(), counting(&calls, Duration::ZERO)).await;
    assert_eq!(doubled.select(&first).data().copied(), Some(2));
    assert_eq!(doubled.select(&cache.snapshot::<usize>(&key).await).data().copied(), Some(2));
    assert_eq!(doubled.computations(), 1);

    let second = cache.refetch::<usize>(&key).await;
    assert_eq!(doubled.select(&second).data().copied(), Some(4));
    assert_eq!(doubled.computations(), 2);
}
