//! # riskpeers
//!
//! Groups equities with similar risk profiles.
//!
//! Each ticker in a sector is described by its annualized return, annualized
//! volatility, and beta to a benchmark. A seeded k-means model, with its
//! cluster count picked by an elbow search, partitions the sector, and the
//! peers of a ticker are the nearest members of its cluster.
//!
//! ## Features
//!
//! - `full` (default): Enables all components
//! - `primitives`: Core type definitions
//! - `traits`: Provider and store abstractions
//! - `math`: Moments, k-means, and elbow selection
//! - `features`: Risk feature engineering
//! - `model`: Cluster models, peer grouping, and the sector pipeline
//! - `store`: Model persistence and price caching
//! - `cli`: The `peers` binary backed by Yahoo Finance
//!
//! ## Example
//!
//! ```rust,ignore
//! use riskpeers::{model::{PeerSearch, RiskConfig}, store::JsonModelStore};
//!
//! let search = PeerSearch::new(prices, sectors, JsonModelStore::new("models"), RiskConfig::default());
//! let report = search.run(&"AAPL".into(), None, chrono::Utc::now())?;
//! for (peer, features) in &report.peers {
//!     println!("{peer}: beta {:.2}", features.beta);
//! }
//! ```

#![doc(issue_tracker_base_url = "https://github.com/riskpeers/riskpeers-rs/issues/")]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

#[cfg(feature = "primitives")]
#[doc(inline)]
pub use riskpeers_primitives as primitives;
#[cfg(feature = "traits")]
#[doc(inline)]
pub use riskpeers_traits as traits;
#[cfg(feature = "math")]
#[doc(inline)]
pub use riskpeers_math as math;
#[cfg(feature = "features")]
#[doc(inline)]
pub use riskpeers_features as features;
#[cfg(feature = "model")]
#[doc(inline)]
pub use riskpeers_model as model;
#[cfg(feature = "store")]
#[doc(inline)]
pub use riskpeers_store as store;
