mod common;

use common::integer_pool;
use esox_resourcepool::{PoolConfiguration, PoolError};
use std::time::Duration;

#[tokio::test]
async fn test_async_borrow_reuses_lifo() {
    let (pool, _) = integer_pool(PoolConfiguration::default());

    let a = pool.borrow_object_async().await.unwrap();
    let b = pool.borrow_object_async().await.unwrap();
    assert_eq!((*a, *b), (1, 2));

    pool.return_object(a).unwrap();
    pool.return_object(b).unwrap();

    assert_eq!(*pool.borrow_object_async().await.unwrap(), 2);
}

#[tokio::test]
async fn test_async_borrow_waits_for_release() {
    let (pool, _) = integer_pool(PoolConfiguration::new().with_max_active(1));

    let held = pool.borrow_object_async().await.unwrap();
    let id = held.id();

    let releaser = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        drop(held);
    });

    let obj = pool.borrow_object_async().await.unwrap();
    assert_eq!(obj.id(), id);
    assert_eq!(pool.get_metrics().wait_events, 1);

    releaser.await.unwrap();
}

#[tokio::test]
async fn test_async_borrow_fails_fast_without_waiting() {
    let config = PoolConfiguration::new()
        .with_max_active(1)
        .with_wait_for_idle(false);
    let (pool, _) = integer_pool(config);

    let _held = pool.borrow_object_async().await.unwrap();
    assert!(matches!(
        pool.borrow_object_async().await,
        Err(PoolError::Exhausted)
    ));
}

#[tokio::test]
async fn test_async_borrow_times_out() {
    let config = PoolConfiguration::new()
        .with_max_active(1)
        .with_max_wait(Duration::from_millis(20));
    let (pool, _) = integer_pool(config);

    let _held = pool.borrow_object_async().await.unwrap();
    assert!(matches!(
        pool.borrow_object_async().await,
        Err(PoolError::Timeout(_))
    ));
}

#[tokio::test]
async fn test_cancelled_async_borrow_leaks_nothing() {
    let (pool, _) = integer_pool(PoolConfiguration::new().with_max_active(1));

    let held = pool.borrow_object_async().await.unwrap();
    let cancelled =
        tokio::time::timeout(Duration::from_millis(10), pool.borrow_object_async()).await;
    assert!(cancelled.is_err());

    pool.return_object(held).unwrap();
    let obj = pool.borrow_object().unwrap();
    assert_eq!(*obj, 1);
    assert_eq!(pool.active_count(), 1);
    assert_eq!(pool.idle_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_blocking_and_async_borrowers_share_one_pool() {
    let (pool, _) = integer_pool(PoolConfiguration::new().with_max_active(2));

    let tasks: Vec<_> = (0..4)
        .map(|i| {
            let pool = pool.clone();
            tokio::spawn(async move {
                for _ in 0..25 {
                    if i % 2 == 0 {
                        let obj = pool.borrow_object_async().await.unwrap();
                        tokio::task::yield_now().await;
                        drop(obj);
                    } else {
                        let pool = pool.clone();
                        tokio::task::spawn_blocking(move || {
                            let obj = pool.borrow_object().unwrap();
                            pool.return_object(obj).unwrap();
                        })
                        .await
                        .unwrap();
                    }
                }
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(pool.active_count(), 0);
    assert!(pool.idle_count() <= 2);
    assert_eq!(pool.get_metrics().total_borrowed, 100);
}
