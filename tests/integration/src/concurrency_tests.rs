//! Concurrency scenarios: many nodes, racing producers and consumers.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use convoy::prelude::*;

use crate::support::{cluster_request, cluster_snapshot};

#[test]
fn hundred_nodes_each_woken_exactly_once() {
    let cache = SnapshotCache::builder().build();

    let mut watches = Vec::new();
    for i in 0..100 {
        let (watch, cancel) = cache.create_watch(cluster_request(&format!("node-{i}"), "v0"));
        assert!(cancel.is_some(), "no snapshot yet, watch must stay open");
        watches.push((i, watch));
    }

    // One producer walks every node.
    for i in 0..100 {
        cache.set_snapshot(&format!("node-{i}"), cluster_snapshot(&format!("v{i}"), &["a"]));
    }

    // Exactly one response per watch, each matching its node's version.
    for (i, watch) in watches {
        let response = watch.blocking_recv().expect("every watch is woken");
        assert_eq!(response.version.as_str(), format!("v{i}"));
    }
}

#[test]
fn concurrent_producers_and_fetchers() {
    let cache = Arc::new(SnapshotCache::builder().build());
    let mut handles = Vec::new();

    for i in 0..8 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            let node = format!("node-{i}");
            for round in 0..200 {
                cache.set_snapshot(&node, cluster_snapshot(&format!("v{round}"), &["a"]));
                let response = cache
                    .fetch(&cluster_request(&node, ""))
                    .expect("a snapshot was just installed");
                assert!(!response.version.is_empty());
            }
        }));
    }

    for handle in handles {
        handle.join().expect("producer thread panicked");
    }

    assert_eq!(cache.snapshot_count(), 8);
    assert_eq!(cache.stats().snapshots_set(), 8 * 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn producer_races_watchers() {
    let cache = Arc::new(SnapshotCache::builder().build());

    // Consumers keep re-subscribing; the producer keeps bumping versions.
    // Every delivered response must carry a version the producer installed.
    let mut consumers = Vec::new();
    for _ in 0..4 {
        let cache = Arc::clone(&cache);
        consumers.push(tokio::spawn(async move {
            let mut version = String::new();
            let mut delivered = 0usize;
            while delivered < 20 {
                let (watch, _cancel) =
                    cache.create_watch(cluster_request("edge-proxy-1", &version));
                match watch.recv().await {
                    Some(response) => {
                        assert!(response.version.as_str().starts_with('v'));
                        version = response.version.as_str().to_string();
                        delivered += 1;
                    }
                    // Suppression or teardown: start a fresh round.
                    None => version.clear(),
                }
            }
        }));
    }

    let producer = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            for round in 0.. {
                cache.set_snapshot("edge-proxy-1", cluster_snapshot(&format!("v{round}"), &["a"]));
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
    };

    for consumer in consumers {
        tokio::time::timeout(Duration::from_secs(30), consumer)
            .await
            .expect("consumers must make progress")
            .expect("consumer panicked");
    }
    producer.abort();
}

#[test]
fn cancel_races_set_snapshot() {
    // A watch is either delivered or cancelled, never both; cancelling
    // concurrently with delivery must never panic.
    for _ in 0..50 {
        let cache = Arc::new(SnapshotCache::builder().build());
        let (watch, cancel) = cache.create_watch(cluster_request("n", ""));
        let cancel = cancel.expect("watch is open");

        let setter = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                cache.set_snapshot("n", cluster_snapshot("v1", &["a"]));
            })
        };
        let canceller = thread::spawn(move || {
            cancel.cancel();
        });

        setter.join().expect("setter panicked");
        canceller.join().expect("canceller panicked");

        // At most one response; afterwards the watch table is empty.
        let _ = watch.blocking_recv();
        assert_eq!(
            cache.get_status_info("n").map(|s| s.num_watches()),
            Some(0)
        );
    }
}

#[test]
fn clear_races_watch_creation() {
    let cache = Arc::new(SnapshotCache::builder().build());
    let mut handles = Vec::new();

    for i in 0..4 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for round in 0..100 {
                let node = format!("node-{}", (i + round) % 4);
                let (_watch, cancel) = cache.create_watch(cluster_request(&node, ""));
                if let Some(cancel) = cancel {
                    cancel.cancel();
                }
                cache.clear_snapshot(&node);
            }
        }));
    }

    for handle in handles {
        handle.join().expect("thread panicked");
    }
}

#[test]
fn watches_across_nodes_do_not_interfere() {
    let cache = SnapshotCache::builder().build();

    let (mut watch_a, _ca) = cache.create_watch(cluster_request("node-a", ""));
    let (mut watch_b, _cb) = cache.create_watch(cluster_request("node-b", ""));

    cache.set_snapshot("node-a", cluster_snapshot("v1", &["a"]));

    assert!(watch_a.try_recv().is_ok());
    assert!(watch_b.try_recv().is_err(), "other node stays asleep");
}
