//! Public market data endpoints

/// Public REST endpoints under `https://indodax.com/api/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublicEndpoint {
    ServerTime,
    Pairs,
    PriceIncrements,
    Summaries,
    /// Ticker for one pair, or the default aggregate ticker when `None`
    Ticker(Option<String>),
    TickerAll,
    /// Recent trades for one pair, or the default pair when `None`
    Trades(Option<String>),
}

impl PublicEndpoint {
    /// Build a per-pair endpoint, treating an empty pair id as absent
    pub fn ticker(pair_id: Option<&str>) -> Self {
        Self::Ticker(non_empty(pair_id))
    }

    pub fn trades(pair_id: Option<&str>) -> Self {
        Self::Trades(non_empty(pair_id))
    }

    /// Unescaped path segments relative to the public base URL
    ///
    /// A pair id is always one segment, whatever characters it holds.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Self::ServerTime => vec!["server_time"],
            Self::Pairs => vec!["pairs"],
            Self::PriceIncrements => vec!["price_increments"],
            Self::Summaries => vec!["summaries"],
            Self::Ticker(None) => vec!["ticker"],
            Self::Ticker(Some(pair)) => vec!["ticker", pair],
            Self::TickerAll => vec!["ticker_all"],
            Self::Trades(None) => vec!["trades"],
            Self::Trades(Some(pair)) => vec!["trades", pair],
        }
    }

    /// Readable form of the path, e.g. `ticker/btc_idr`
    pub fn path(&self) -> String {
        self.segments().join("/")
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|s| !s.is_empty()).map(str::to_string)
}
