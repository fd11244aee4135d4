#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/riskpeers/riskpeers-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod moments;
pub use moments::{
    euclidean_distance, mean, population_covariance, population_std, population_variance,
    squared_euclidean,
};

mod kmeans;
pub use kmeans::{KMeans, KMeansFit};

mod elbow;
pub use elbow::{second_differences, select_elbow};

mod error;
pub use error::MathError;
