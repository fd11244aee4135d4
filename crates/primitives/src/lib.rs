#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/riskpeers/riskpeers-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod symbol;
pub use symbol::{SectorKey, Symbol};

mod prices;
pub use prices::{HistoryWindow, Interval, LogReturns, PricePoint, PriceSeries};

mod features;
pub use features::{FEATURE_NAMES, FeatureMatrix, MAX_FEATURE_MAGNITUDE, N_FEATURES, RiskFeatures};

mod cluster;
pub use cluster::{ClusterAssignment, ClusterModel};

mod error;
pub use error::PrimitiveError;

/// Re-export common date type.
pub type Date = chrono::NaiveDate;
