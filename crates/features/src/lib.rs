#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/riskpeers/riskpeers-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod engineer;
pub use engineer::{
    FeatureConfig, FeatureEngineer, annualized_return, annualized_volatility, beta,
};

mod align;
pub use align::{AlignedReturns, align_returns};

mod frame;
pub use frame::feature_frame;

mod error;
pub use error::FeatureError;
