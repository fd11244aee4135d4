#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/riskpeers/riskpeers-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod manager;
pub use manager::{ClusterConfig, ClusterModelManager};

mod grouper;
pub use grouper::{GrouperConfig, Peer, RiskGrouper};

mod config;
pub use config::RiskConfig;

mod pipeline;
pub use pipeline::{PeerReport, PeerSearch};

mod error;
pub use error::ModelError;

/// Re-export commonly used types.
pub mod prelude {
    pub use riskpeers_traits::{ModelStore, PriceProvider, SectorLookup};

    pub use super::{
        ClusterModelManager, ModelError, PeerReport, PeerSearch, RiskConfig, RiskGrouper,
    };
}
