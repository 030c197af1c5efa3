//! End-to-end cache scenarios over the public API.

use std::sync::Arc;
use std::time::Duration;

use convoy::prelude::*;

use crate::support::{cluster_request, cluster_snapshot, res};

#[tokio::test]
async fn watch_then_snapshot_wakes_client() {
    let cache = SnapshotCache::builder().build();

    let (watch, cancel) = cache.create_watch(cluster_request("edge-proxy-1", ""));
    assert!(cancel.is_some());

    cache.set_snapshot("edge-proxy-1", cluster_snapshot("v1", &["a", "b"]));

    let response = tokio::time::timeout(Duration::from_secs(1), watch.recv())
        .await
        .expect("delivery must not hang")
        .expect("watch must be woken");

    assert_eq!(response.version.as_str(), "v1");
    let mut names = response.resource_names();
    names.sort_unstable();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn snapshot_then_watch_responds_immediately() {
    let cache = SnapshotCache::builder().build();
    cache.set_snapshot("edge-proxy-1", cluster_snapshot("v1", &["a"]));

    let (mut watch, cancel) = cache.create_watch(cluster_request("edge-proxy-1", "v0"));
    assert!(cancel.is_none());

    let response = watch.try_recv().expect("response is already queued");
    assert_eq!(response.version.as_str(), "v1");
}

#[tokio::test]
async fn watch_lifecycle_across_version_bumps() {
    let cache = SnapshotCache::builder().build();
    let tag = TypeTag::new(TypeTag::CLUSTER);

    let snapshot = cluster_snapshot("v1", &["a"]);
    cache.set_snapshot("n", Arc::clone(&snapshot));

    // Current client: watch stays open through a same-version re-install.
    let (mut watch, _cancel) = cache.create_watch(cluster_request("n", "v1"));
    cache.set_snapshot("n", Arc::clone(&snapshot));
    assert!(watch.try_recv().is_err());

    cache.set_snapshot("n", snapshot.with_version(&tag, "v2".into()));
    let response = watch.recv().await.expect("version bump wakes the watch");
    assert_eq!(response.version.as_str(), "v2");

    // The next round trips again from the new version.
    let (mut watch, cancel) = cache.create_watch(cluster_request("n", "v2"));
    assert!(cancel.is_some());
    assert!(watch.try_recv().is_err());
}

#[test]
fn fetch_round_trip_and_skip() {
    let cache = SnapshotCache::builder().build();

    let missing = cache.fetch(&cluster_request("n", "")).unwrap_err();
    assert!(matches!(missing, ConvoyError::MissingSnapshot { .. }));

    cache.set_snapshot("n", cluster_snapshot("v1", &["a", "b"]));

    let response = cache.fetch(&cluster_request("n", "")).unwrap();
    assert_eq!(response.version.as_str(), "v1");
    assert_eq!(response.resources.len(), 2);

    // Current clients are skipped, repeatedly.
    for _ in 0..3 {
        let err = cache.fetch(&cluster_request("n", "v1")).unwrap_err();
        assert!(err.is_skip_fetch());
    }
}

#[test]
fn aggregated_mode_holds_back_supersets() {
    let cache = SnapshotCache::builder().aggregated(true).build();
    cache.set_snapshot("n", cluster_snapshot("v1", &["a", "b"]));

    let request = cluster_request("n", "v0").with_names(["a"]);
    let (mut watch, cancel) = cache.create_watch(request);

    // The snapshot carries "b" which the request never named: no delivery.
    assert!(cancel.is_none());
    assert!(watch.try_recv().is_err());
    assert_eq!(cache.stats().responses_suppressed(), 1);

    // A request naming everything is served.
    let request = cluster_request("n", "v0").with_names(["a", "b"]);
    let (mut watch, _cancel) = cache.create_watch(request);
    let response = watch.try_recv().expect("subset check passes");
    assert_eq!(response.resources.len(), 2);
}

#[tokio::test]
async fn clear_snapshot_drops_open_watches() {
    let cache = SnapshotCache::builder().build();

    let (watch, cancel) = cache.create_watch(cluster_request("n", ""));
    cache.set_snapshot("other", cluster_snapshot("v1", &["a"]));
    cache.clear_snapshot("n");

    assert!(watch.recv().await.is_none(), "no delivery on clear");
    assert!(cache.get_status_info("n").is_none());
    assert!(cache.get_snapshot("n").is_err());

    // The cancel handle outlives the node; calling it stays safe.
    let cancel = cancel.expect("watch was open");
    cancel.cancel();
    cancel.cancel();
}

#[test]
fn status_introspection() {
    let cache = SnapshotCache::builder().build();
    let node = Node::new("edge-proxy-1").with_cluster("edge");

    let before = std::time::SystemTime::now();
    let (_watch, _cancel) = cache.create_watch(Request::new(node.clone(), TypeTag::CLUSTER));
    let (_watch2, _cancel2) = cache.create_watch(Request::new(node.clone(), TypeTag::ROUTE));

    let status = cache.get_status_info("edge-proxy-1").expect("status exists");
    assert_eq!(status.node(), &node);
    assert_eq!(status.num_watches(), 2);
    assert!(status.last_watch_request_time() >= before);

    assert_eq!(cache.get_status_keys(), vec!["edge-proxy-1".to_string()]);
}

#[test]
fn responses_survive_snapshot_replacement() {
    let cache = SnapshotCache::builder().build();
    cache.set_snapshot("n", cluster_snapshot("v1", &["a"]));

    let response = cache.fetch(&cluster_request("n", "")).unwrap();

    // Replacing and clearing the stored snapshot must not invalidate
    // resources already handed out.
    cache.set_snapshot("n", cluster_snapshot("v2", &["b"]));
    cache.clear_snapshot("n");

    assert_eq!(response.resource_names(), vec!["a"]);
    assert_eq!(response.resources[0].encode().unwrap().type_url, "cluster");
}

#[test]
fn custom_hasher_keys_the_cache() {
    let cache = SnapshotCache::builder().hasher(FnvNodeHash).build();
    let node = Node::new("edge-proxy-1");
    let key = cache.node_key(&node);
    assert_ne!(key, node.id);

    cache.set_snapshot(&key, cluster_snapshot("v1", &["a"]));

    let response = cache
        .fetch(&Request::new(node, TypeTag::CLUSTER))
        .expect("request resolves through the same hasher");
    assert_eq!(response.version.as_str(), "v1");
}

#[test]
fn one_resource_per_request_stream() {
    // Non-aggregated consumers may ask for each resource on its own stream;
    // each gets the same version with its own selection.
    let cache = SnapshotCache::builder().build();
    cache.set_snapshot("n", cluster_snapshot("v1", &["a", "b", "c"]));

    for name in ["a", "b", "c"] {
        let request = cluster_request("n", "").with_names([name]);
        let response = cache.fetch(&request).unwrap();
        assert_eq!(response.version.as_str(), "v1");
        assert_eq!(response.resource_names(), vec![name]);
    }
}

#[test]
fn multi_type_snapshot_serves_each_type() {
    let cache = SnapshotCache::builder().build();

    let snapshot = SimpleSnapshot::builder()
        .version("v1")
        .resources(TypeTag::CLUSTER, vec![res("cluster", "backend")])
        .resources(TypeTag::ENDPOINT, vec![res("endpoint", "backend")])
        .dependency(TypeTag::CLUSTER, TypeTag::ENDPOINT)
        .build();
    assert!(snapshot.consistent().is_ok());
    cache.set_snapshot("n", Arc::new(snapshot));

    for tag in [TypeTag::CLUSTER, TypeTag::ENDPOINT] {
        let response = cache
            .fetch(&Request::new(Node::new("n"), tag))
            .expect("both types are served");
        assert_eq!(response.version.as_str(), "v1");
        assert_eq!(response.resources.len(), 1);
    }
}
