#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/riskpeers/riskpeers-rs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod calendar;
pub use calendar::{MarketCalendar, eastern_offset, is_eastern_dst, to_eastern};

mod model_store;
pub use model_store::JsonModelStore;

mod price_cache;
pub use price_cache::{CacheError, CachedPriceProvider, read_price_csv, write_price_csv};
