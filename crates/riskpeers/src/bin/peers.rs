//! Risk peer lookup CLI tool.
//!
//! Finds the equities in a ticker's sector whose return, volatility, and
//! beta profile is closest to it.
//!
//! Usage: `cargo run --bin peers -- SYMBOL [--config FILE] [--peers N]
//! [--sector NAME] [--model-dir DIR] [--cache-dir DIR]`
//! Example: `cargo run --bin peers -- NVDA --peers 5`

use std::{collections::BTreeMap, env, path::PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use riskpeers::{
    features::feature_frame,
    model::{PeerReport, PeerSearch, RiskConfig},
    primitives::{HistoryWindow, PriceSeries, Symbol},
    store::{CachedPriceProvider, JsonModelStore},
    traits::{PriceProvider, ProviderError, SectorLookup},
};
use time::{Duration, OffsetDateTime};
use tokio::runtime::Runtime;
use yahoo_finance_api as yahoo;

const DEFAULT_MODEL_DIR: &str = "models";
const DEFAULT_CACHE_DIR: &str = "data/cache";

/// Reference universe organized by sector.
const UNIVERSE: &[(&str, &[&str])] = &[
    ("Technology", &["AAPL", "MSFT", "GOOGL", "META", "NVDA", "AMD", "INTC", "CRM", "ADBE", "ORCL"]),
    ("Healthcare", &["JNJ", "UNH", "PFE", "MRK", "ABBV", "TMO", "ABT", "LLY", "BMY", "AMGN"]),
    ("Financial Services", &["JPM", "BAC", "WFC", "GS", "MS", "C", "BLK", "SCHW", "AXP", "USB"]),
    ("Energy", &["XOM", "CVX", "COP", "EOG", "SLB", "PSX", "MPC", "VLO", "OXY", "HAL"]),
    ("Consumer Defensive", &["PG", "KO", "PEP", "WMT", "COST", "MDLZ", "CL", "KMB", "GIS", "KHC"]),
    ("Utilities", &["NEE", "DUK", "SO", "D", "AEP", "EXC", "SRE", "XEL", "ED", "PEG"]),
];

/// Command line options.
#[derive(Debug)]
struct Args {
    symbol: Symbol,
    config: Option<PathBuf>,
    peers: Option<usize>,
    sector: Option<String>,
    model_dir: PathBuf,
    cache_dir: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "riskpeers=info,peers=info".into()),
        )
        .init();

    let raw: Vec<String> = env::args().collect();
    let Some(args) = parse_args(&raw) else {
        eprintln!("Usage: peers SYMBOL [--config FILE] [--peers N] [--sector NAME] [--model-dir DIR] [--cache-dir DIR]");
        eprintln!("Example: peers NVDA --peers 5");
        std::process::exit(1);
    };

    let mut config = match &args.config {
        Some(path) => RiskConfig::from_json_file(path)?,
        None => RiskConfig::default(),
    };
    if let Some(n) = args.peers {
        config.default_peer_count = n;
    }

    let universe = Universe::new(args.sector.map(|s| (args.symbol.clone(), s)));
    let prices = CachedPriceProvider::new(YahooProvider::new()?, &args.cache_dir);
    let store = JsonModelStore::new(&args.model_dir);
    let search = PeerSearch::new(prices, universe, store, config);

    println!("\nFinding risk peers of {}...\n", args.symbol);
    match search.run(&args.symbol, None, Utc::now()) {
        Ok(report) => print_report(&report)?,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn parse_args(args: &[String]) -> Option<Args> {
    let symbol = args.get(1).filter(|s| !s.starts_with("--"))?;
    let value = |flag: &str| {
        args.iter().position(|a| a == flag).and_then(|i| args.get(i + 1)).cloned()
    };

    let peers = match value("--peers") {
        Some(n) => Some(n.parse().ok()?),
        None if args.iter().any(|a| a == "--peers") => return None,
        None => None,
    };

    Some(Args {
        symbol: Symbol::normalized(symbol),
        config: value("--config").map(PathBuf::from),
        peers,
        sector: value("--sector"),
        model_dir: value("--model-dir").map_or_else(|| DEFAULT_MODEL_DIR.into(), PathBuf::from),
        cache_dir: value("--cache-dir").map_or_else(|| DEFAULT_CACHE_DIR.into(), PathBuf::from),
    })
}

fn print_report(report: &PeerReport) -> Result<(), Box<dyn std::error::Error>> {
    println!("Sector:   {}", report.sector);
    println!("Clusters: {}", report.k());
    if !report.dropped.is_empty() {
        let dropped: Vec<&str> = report.dropped.iter().map(Symbol::as_str).collect();
        println!("Skipped:  {}", dropped.join(", "));
    }

    if report.peers.is_empty() {
        println!("\n{} has no peers in its risk cluster.", report.symbol);
        return Ok(());
    }

    println!("\n{} followed by its nearest peers:", report.symbol);
    println!("{}", feature_frame(&report.feature_matrix())?);
    Ok(())
}

/// Static sector membership, plus sectors given on the command line.
#[derive(Debug)]
struct Universe {
    sectors: BTreeMap<&'static str, Vec<Symbol>>,
    extra: Option<(Symbol, String)>,
}

impl Universe {
    fn new(extra: Option<(Symbol, String)>) -> Self {
        let sectors = UNIVERSE
            .iter()
            .map(|(sector, tickers)| (*sector, tickers.iter().map(|t| Symbol::from(*t)).collect()))
            .collect();
        Self { sectors, extra }
    }
}

impl SectorLookup for Universe {
    fn sector_of(&self, symbol: &Symbol) -> Result<String, ProviderError> {
        if let Some((extra, sector)) = &self.extra
            && extra == symbol
        {
            return Ok(sector.clone());
        }
        self.sectors
            .iter()
            .find(|(_, members)| members.contains(symbol))
            .map(|(sector, _)| (*sector).to_string())
            .ok_or_else(|| ProviderError::UnknownTicker(symbol.clone()))
    }

    fn sector_members(&self, sector: &str) -> Result<Vec<Symbol>, ProviderError> {
        self.sectors
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(sector))
            .map(|(_, members)| members.clone())
            .ok_or_else(|| ProviderError::UnknownSector(sector.to_string()))
    }
}

/// Daily closes from Yahoo Finance, fetched on a private runtime.
struct YahooProvider {
    connector: yahoo::YahooConnector,
    runtime: Runtime,
}

impl std::fmt::Debug for YahooProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YahooProvider").finish_non_exhaustive()
    }
}

impl YahooProvider {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self { connector: yahoo::YahooConnector::new()?, runtime: Runtime::new()? })
    }
}

impl PriceProvider for YahooProvider {
    fn fetch_prices(
        &self,
        symbol: &Symbol,
        window: &HistoryWindow,
    ) -> Result<PriceSeries, ProviderError> {
        let retrieval =
            |reason: String| ProviderError::Retrieval { symbol: symbol.clone(), reason };

        let end = OffsetDateTime::now_utc();
        let start = end - Duration::days(i64::from(window.lookback_days));
        let response = self
            .runtime
            .block_on(self.connector.get_quote_history_interval(
                symbol.as_str(),
                start,
                end,
                window.interval.code(),
            ))
            .map_err(|e| retrieval(e.to_string()))?;
        let quotes = response.quotes().map_err(|e| retrieval(e.to_string()))?;

        // the latest quote can repeat the last session's date
        let mut closes: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for quote in quotes {
            let Some(at) = DateTime::from_timestamp(quote.timestamp, 0) else {
                continue;
            };
            if quote.adjclose.is_finite() && quote.adjclose > 0.0 {
                closes.insert(at.date_naive(), quote.adjclose);
            }
        }
        if closes.is_empty() {
            return Err(ProviderError::NoData(symbol.clone()));
        }
        tracing::debug!(%symbol, observations = closes.len(), "fetched prices");
        Ok(PriceSeries::from_pairs(closes)?)
    }
}
