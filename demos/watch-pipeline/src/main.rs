//! Watch pipeline demo.
//!
//! One producer assembles cluster/endpoint snapshots and bumps their version
//! a few times; a handful of consumers hold watches and re-subscribe after
//! every delivery, the way a discovery server drives the cache.
//!
//! Run with:
//! ```bash
//! cargo run -p watch-pipeline
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use convoy::prelude::*;

const NODE: &str = "edge-proxy-1";
const ROUNDS: usize = 5;

fn build_snapshot(version: usize) -> Result<Arc<dyn Snapshot>> {
    let cluster = |name: &str| -> BoxResource {
        Arc::new(AnyResource::new(
            TypeTag::CLUSTER,
            name,
            prost_types::Any {
                type_url: TypeTag::CLUSTER.to_string(),
                value: format!("cluster:{name}@v{version}").into_bytes(),
            },
        ))
    };
    let endpoint = |name: &str| -> BoxResource {
        Arc::new(AnyResource::new(
            TypeTag::ENDPOINT,
            name,
            prost_types::Any {
                type_url: TypeTag::ENDPOINT.to_string(),
                value: format!("endpoint:{name}@v{version}").into_bytes(),
            },
        ))
    };

    let snapshot = SimpleSnapshot::builder()
        .version(format!("v{version}"))
        .resources(TypeTag::CLUSTER, vec![cluster("backend"), cluster("metrics")])
        .resources(TypeTag::ENDPOINT, vec![endpoint("backend"), endpoint("metrics")])
        .dependency(TypeTag::CLUSTER, TypeTag::ENDPOINT)
        .build();

    // Producers gate on consistency before installing.
    snapshot.consistent()?;
    Ok(Arc::new(snapshot))
}

async fn consume(cache: SnapshotCache, type_tag: &'static str) {
    let mut version = ResourceVersion::empty();
    let mut received = 0usize;

    while received < ROUNDS {
        let request =
            Request::new(Node::new(NODE), type_tag).with_version(version.clone());
        let (watch, _cancel) = cache.create_watch(request);

        match watch.recv().await {
            Some(response) => {
                info!(
                    type_tag,
                    version = %response.version,
                    resources = response.resources.len(),
                    "consumer applied update"
                );
                version = response.version;
                received += 1;
            }
            None => {
                // Watch torn down without delivery; resubscribe from scratch.
                version = ResourceVersion::empty();
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("{}", convoy::version::version_string());

    let cache = SnapshotCache::builder().build();

    let consumers = vec![
        tokio::spawn(consume(cache.clone(), TypeTag::CLUSTER)),
        tokio::spawn(consume(cache.clone(), TypeTag::ENDPOINT)),
    ];

    for round in 1..=ROUNDS {
        tokio::time::sleep(Duration::from_millis(200)).await;
        let snapshot = build_snapshot(round)?;
        cache.set_snapshot(NODE, snapshot);
        info!(version = round, "producer installed snapshot");
    }

    for consumer in consumers {
        consumer.await?;
    }

    let stats = cache.stats();
    info!(
        watches_opened = stats.watches_opened(),
        responses_delivered = stats.responses_delivered(),
        snapshots_set = stats.snapshots_set(),
        "pipeline complete"
    );

    Ok(())
}
