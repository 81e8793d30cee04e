// Market data collaborators: where candle series come from.
pub mod binance;
pub mod csv_parser;
pub mod market_data;
pub mod source;

pub use binance::BinanceKlineSource;
pub use source::{CachedSource, CandleSource, CsvCandleSource};
