use crate::error::EngineError;
use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use shared::models::Candle;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

// Field parsing for kline exports: plain decimal prices, timestamps as epoch milliseconds or RFC 3339.
pub mod kline_format {
    use crate::error::EngineError;
    use chrono::{DateTime, Utc};

    pub fn parse_price(s: &str) -> Result<f64, EngineError> {
        s.trim()
            .parse::<f64>()
            .map_err(|e| EngineError::CsvDataFormatError(format!("Failed to parse price '{}': {}", s, e)))
    }

    pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, EngineError> {
        let s = s.trim();
        if let Ok(millis) = s.parse::<i64>() {
            return DateTime::from_timestamp_millis(millis)
                .ok_or_else(|| EngineError::CsvDataFormatError(format!("Timestamp '{}' out of range", s)));
        }
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| EngineError::CsvDataFormatError(format!("Failed to parse timestamp '{}': {}", s, e)))
    }

}

const REQUIRED_COLUMNS: [&str; 5] = ["time", "open", "high", "low", "close"];

pub struct KlineCsvParser;

impl KlineCsvParser {
    // Header: time,open,high,low,close[,anything else]
    // Example row: 1714565700000,64010.5,64120.0,63990.1,64100.2
    pub fn load_candles_from_csv(file_path: impl AsRef<Path>) -> Result<Vec<Candle>, EngineError> {
        let file = File::open(file_path.as_ref())?;
        Self::read_candles(BufReader::new(file))
    }

    pub fn read_candles<R: Read>(reader: R) -> Result<Vec<Candle>, EngineError> {
        let mut rdr = ReaderBuilder::new().has_headers(true).trim(csv::Trim::All).from_reader(reader);

        let headers = rdr.headers()?.clone();
        let positions = Self::column_positions(&headers)?;

        let mut candles = Vec::new();
        for (idx, result) in rdr.records().enumerate() {
            let record = result?;
            let line = idx + 2;
            let at_line = |e: EngineError| match e {
                EngineError::CsvDataFormatError(msg) => {
                    EngineError::CsvDataFormatError(format!("Line {}: {}", line, msg))
                }
                other => other,
            };

            let timestamp: DateTime<Utc> =
                kline_format::parse_timestamp(Self::get_field(&record, &positions, 0, line)?).map_err(at_line)?;
            let open = kline_format::parse_price(Self::get_field(&record, &positions, 1, line)?).map_err(at_line)?;
            let high = kline_format::parse_price(Self::get_field(&record, &positions, 2, line)?).map_err(at_line)?;
            let low = kline_format::parse_price(Self::get_field(&record, &positions, 3, line)?).map_err(at_line)?;
            let close = kline_format::parse_price(Self::get_field(&record, &positions, 4, line)?).map_err(at_line)?;

            candles.push(Candle { timestamp, open, high, low, close });
        }
        tracing::debug!(count = candles.len(), "Parsed candles from CSV");
        Ok(candles)
    }

    fn get_field<'a>(record: &'a StringRecord, positions: &[usize; 5], col: usize, line: usize) -> Result<&'a str, EngineError> {
        record.get(positions[col]).ok_or_else(|| {
            EngineError::CsvDataFormatError(format!("Missing '{}' field at line {}", REQUIRED_COLUMNS[col], line))
        })
    }

    fn column_positions(headers: &StringRecord) -> Result<[usize; 5], EngineError> {
        let mut positions = [0usize; 5];
        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers
                .iter()
                .position(|header| header.eq_ignore_ascii_case(name))
                .ok_or_else(|| EngineError::CsvDataFormatError(format!("Missing '{}' column in CSV header", name)))?;
        }
        Ok(positions)
    }
}
