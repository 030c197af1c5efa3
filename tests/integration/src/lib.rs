//! Integration tests for the convoy workspace.

#[cfg(test)]
mod cache_tests;
#[cfg(test)]
mod concurrency_tests;

/// Test helpers shared by the integration modules.
#[cfg(test)]
mod support {
    use std::sync::Arc;

    use convoy::prelude::*;

    /// A pre-encoded resource for tests.
    pub fn res(tag: &str, name: &str) -> BoxResource {
        Arc::new(AnyResource::new(
            tag,
            name,
            prost_types::Any {
                type_url: tag.to_string(),
                value: vec![],
            },
        ))
    }

    /// A single-type cluster snapshot at `version` with the given names.
    pub fn cluster_snapshot(version: &str, names: &[&str]) -> Arc<dyn Snapshot> {
        Arc::new(SimpleSnapshot::single(
            TypeTag::CLUSTER,
            version,
            names.iter().map(|n| res("cluster", n)).collect::<Vec<_>>(),
        ))
    }

    /// A cluster request from `node` at `version`.
    pub fn cluster_request(node: &str, version: &str) -> Request {
        Request::new(Node::new(node), TypeTag::CLUSTER).with_version(version)
    }
}
