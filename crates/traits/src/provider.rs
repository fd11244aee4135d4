//! Market data provider trait definitions.

use riskpeers_primitives::{HistoryWindow, PriceSeries, Symbol};

/// Errors that can occur while retrieving market data.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The ticker is unknown to the provider.
    #[error("unknown ticker: {0}")]
    UnknownTicker(Symbol),

    /// The sector is unknown to the provider.
    #[error("unknown sector: {0}")]
    UnknownSector(String),

    /// The provider returned no usable observations.
    #[error("no price data for {0}")]
    NoData(Symbol),

    /// Retrieval failed (network, remote service, local cache).
    #[error("retrieval failed for {symbol}: {reason}")]
    Retrieval {
        /// Ticker being fetched.
        symbol: Symbol,
        /// Underlying failure.
        reason: String,
    },

    /// The returned data violated a series invariant.
    #[error("invalid data: {0}")]
    InvalidData(#[from] riskpeers_primitives::PrimitiveError),
}

impl ProviderError {
    /// Returns whether retrying the same request may succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Retrieval { .. })
    }
}

/// Source of historical close prices.
pub trait PriceProvider {
    /// Fetch close prices for `symbol` over `window`.
    ///
    /// # Errors
    /// Returns `ProviderError` if the ticker or source is unavailable.
    fn fetch_prices(
        &self,
        symbol: &Symbol,
        window: &HistoryWindow,
    ) -> Result<PriceSeries, ProviderError>;
}

impl<T: PriceProvider + ?Sized> PriceProvider for &T {
    fn fetch_prices(
        &self,
        symbol: &Symbol,
        window: &HistoryWindow,
    ) -> Result<PriceSeries, ProviderError> {
        (**self).fetch_prices(symbol, window)
    }
}

/// Source of sector classification metadata.
pub trait SectorLookup {
    /// Sector name of a ticker.
    ///
    /// # Errors
    /// Returns `ProviderError::UnknownTicker` if the ticker is not classified.
    fn sector_of(&self, symbol: &Symbol) -> Result<String, ProviderError>;

    /// Tickers belonging to a sector.
    ///
    /// # Errors
    /// Returns `ProviderError::UnknownSector` if the sector is not known.
    fn sector_members(&self, sector: &str) -> Result<Vec<Symbol>, ProviderError>;
}

impl<T: SectorLookup + ?Sized> SectorLookup for &T {
    fn sector_of(&self, symbol: &Symbol) -> Result<String, ProviderError> {
        (**self).sector_of(symbol)
    }

    fn sector_members(&self, sector: &str) -> Result<Vec<Symbol>, ProviderError> {
        (**self).sector_members(sector)
    }
}
