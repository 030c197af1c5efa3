//! # convoy-core
//!
//! Core types, traits, and error handling for the convoy configuration
//! distribution cache.
//!
//! This crate provides the vocabulary shared by producers (snapshot
//! assemblers) and consumers (discovery servers):
//!
//! - [`ConvoyError`] - Error type with proper gRPC status code mapping
//! - [`Node`] - Opaque data-plane node descriptor
//! - [`NodeHash`] - Trait collapsing a node descriptor to a stable cache key
//! - [`Resource`] - Trait for configuration resources the cache distributes
//! - [`TypeTag`] - Opaque resource-category tag
//! - [`ResourceVersion`] - Equality-compared version string
//! - [`Request`] / [`Response`] - Subscription contracts
//!
//! ## Example
//!
//! ```rust
//! use convoy_core::{IdHash, Node, NodeHash, ResourceVersion};
//!
//! let node = Node::new("edge-proxy-1");
//! let key = IdHash.id(&node);
//! assert_eq!(key, "edge-proxy-1");
//!
//! // An empty version marks a fresh client.
//! assert!(ResourceVersion::empty().is_empty());
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod node;
mod request;
mod resource;
mod type_tag;
mod version;

pub use error::ConvoyError;
pub use node::{FnvNodeHash, IdHash, Locality, Node, NodeHash};
pub use request::{Request, Response};
pub use resource::{AnyResource, BoxResource, Resource};
pub use type_tag::TypeTag;
pub use version::ResourceVersion;

/// Result type alias using [`ConvoyError`].
pub type Result<T> = std::result::Result<T, ConvoyError>;

/// Alias for [`Result`] usable alongside `std::result::Result` imports.
pub type ConvoyResult<T> = Result<T>;
