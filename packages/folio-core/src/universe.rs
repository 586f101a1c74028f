//! Default candidate instruments per category.

use crate::types::AssetCategory;
use std::collections::BTreeMap;

const STOCKS: &[&str] = &[
    "AAPL", "MSFT", "GOOGL", "AMZN", "NVDA", "META", "TSLA", "BRK-B", "JPM", "V",
];
const BONDS: &[&str] = &["AGG", "BND", "TLT", "IEF", "SHY"];
const CRYPTO: &[&str] = &["BTC-USD", "ETH-USD", "SOL-USD", "ADA-USD"];
const MUTUAL_FUNDS: &[&str] = &["VFIAX", "VTSAX", "VBTLX", "VTIAX"];
const EMERGING_MARKETS: &[&str] = &["VWO", "IEMG", "EEM", "SCHE"];
const ETFS: &[&str] = &["SPY", "QQQ", "VTI", "IVV", "VOO"];

/// Symbols considered for a category when no custom universe is supplied.
pub fn default_symbols(category: AssetCategory) -> &'static [&'static str] {
    match category {
        AssetCategory::Stocks => STOCKS,
        AssetCategory::Bonds => BONDS,
        AssetCategory::Crypto => CRYPTO,
        AssetCategory::MutualFunds => MUTUAL_FUNDS,
        AssetCategory::EmergingMarkets => EMERGING_MARKETS,
        AssetCategory::Etfs => ETFS,
    }
}

/// The built-in universe covering every category.
pub fn default_universe() -> BTreeMap<AssetCategory, Vec<String>> {
    AssetCategory::ALL
        .into_iter()
        .map(|category| {
            let symbols = default_symbols(category)
                .iter()
                .map(|s| s.to_string())
                .collect();
            (category, symbols)
        })
        .collect()
}
