//! `InstrumentRepository` (§6): read-only metadata lookup. No persisted
//! state lives in the core; the reference implementation here loads a CSV
//! with the exact columns named in §6.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// One row of the instrument metadata table (§6).
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Instrument {
    pub instrument_id: u64,
    pub market: String,
    pub symbol: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub base_currency: String,
    pub quote_currency: String,
    pub minimum_price_variation: Decimal,
    pub lot_size: Decimal,
    pub contract_multiplier: Decimal,
    pub minimum_order_size: Decimal,
}

/// Read-only lookup by `instrument_id` and by `(symbol, product_type,
/// exchange)` (§6). Implementations are expected to load once at startup;
/// the core never mutates this table.
pub trait InstrumentRepository: Send + Sync {
    fn by_id(&self, instrument_id: u64) -> Option<Instrument>;
    fn by_symbol(&self, symbol: &str, product_type: &str, market: &str) -> Option<Instrument>;
}

/// Reference `InstrumentRepository` backed by an in-memory table loaded
/// from the §6 CSV schema, grounded on the teacher's config-loading idiom
/// of parsing once at startup into a plain lookup table.
pub struct CsvInstrumentRepository {
    by_id: HashMap<u64, Arc<Instrument>>,
    by_symbol: HashMap<(String, String, String), Arc<Instrument>>,
}

impl CsvInstrumentRepository {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut by_id = HashMap::new();
        let mut by_symbol = HashMap::new();
        for record in reader.deserialize() {
            let inst: Instrument = record?;
            let rc = Arc::new(inst);
            by_id.insert(rc.instrument_id, rc.clone());
            by_symbol.insert((rc.symbol.clone(), rc.product_type.clone(), rc.market.clone()), rc);
        }
        Ok(Self { by_id, by_symbol })
    }

    pub fn from_rows(rows: Vec<Instrument>) -> Self {
        let mut by_id = HashMap::new();
        let mut by_symbol = HashMap::new();
        for inst in rows {
            let rc = Arc::new(inst);
            by_id.insert(rc.instrument_id, rc.clone());
            by_symbol.insert((rc.symbol.clone(), rc.product_type.clone(), rc.market.clone()), rc);
        }
        Self { by_id, by_symbol }
    }
}

impl InstrumentRepository for CsvInstrumentRepository {
    fn by_id(&self, instrument_id: u64) -> Option<Instrument> {
        self.by_id.get(&instrument_id).map(|rc| (**rc).clone())
    }

    fn by_symbol(&self, symbol: &str, product_type: &str, market: &str) -> Option<Instrument> {
        self.by_symbol
            .get(&(symbol.to_string(), product_type.to_string(), market.to_string()))
            .map(|rc| (**rc).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn btc_usdt() -> Instrument {
        Instrument {
            instrument_id: 1,
            market: "binance".into(),
            symbol: "BTCUSDT".into(),
            product_type: "spot".into(),
            base_currency: "BTC".into(),
            quote_currency: "USDT".into(),
            minimum_price_variation: dec!(0.01),
            lot_size: dec!(0.00001),
            contract_multiplier: dec!(1),
            minimum_order_size: dec!(0.0001),
        }
    }

    #[test]
    fn lookup_by_id_and_symbol() {
        let repo = CsvInstrumentRepository::from_rows(vec![btc_usdt()]);
        assert_eq!(repo.by_id(1).unwrap().symbol, "BTCUSDT");
        assert_eq!(repo.by_symbol("BTCUSDT", "spot", "binance").unwrap().instrument_id, 1);
        assert!(repo.by_id(999).is_none());
    }

    #[test]
    fn load_from_csv() {
        let csv_data = "instrument_id,market,symbol,type,base_currency,quote_currency,minimum_price_variation,lot_size,contract_multiplier,minimum_order_size\n\
                         1,binance,BTCUSDT,spot,BTC,USDT,0.01,0.00001,1,0.0001\n";
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut tmp, csv_data.as_bytes()).unwrap();
        let repo = CsvInstrumentRepository::load(tmp.path()).unwrap();
        assert_eq!(repo.by_id(1).unwrap().quote_currency, "USDT");
    }
}
