// ============================================================================
// Instrument Registry
// ============================================================================

use parking_lot::RwLock;
use std::collections::HashSet;

use crate::domain::{EngineError, Instrument};

/// The venue's store of tradable instruments.
///
/// Registration enforces uniqueness of the composite key
/// `(instrument_id, market_code, currency)`: the first registration wins
/// and duplicates are reported as `false`, not as an error. The registry is
/// effectively read-only once trading begins, so a rarely-contended read
/// lock guards it.
#[derive(Default)]
pub struct InstrumentRegistry {
    inner: RwLock<RegistryInner>,
}

#[derive(Default)]
struct RegistryInner {
    /// Composite keys of everything registered, for duplicate detection
    keys: HashSet<(i64, String, String)>,
    /// Instruments in insertion order
    instruments: Vec<Instrument>,
}

impl InstrumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an instrument.
    ///
    /// Returns `false` (and stores nothing) when an instrument with the
    /// same `(instrument_id, market_code, currency)` already exists.
    pub fn register(&self, instrument: Instrument) -> bool {
        let mut inner = self.inner.write();

        let key = (
            instrument.instrument_id,
            instrument.market_code.clone(),
            instrument.currency.clone(),
        );
        if inner.keys.contains(&key) {
            let reason = EngineError::DuplicateInstrument {
                instrument_id: instrument.instrument_id,
                market_code: instrument.market_code.clone(),
                currency: instrument.currency.clone(),
            };
            tracing::warn!(error = %reason, "registration refused");
            return false;
        }

        inner.keys.insert(key);
        inner.instruments.push(instrument);
        true
    }

    /// All registered instruments, in insertion order.
    pub fn list(&self) -> Vec<Instrument> {
        self.inner.read().instruments.clone()
    }

    /// Exact-match lookup by the composite key.
    pub fn find(&self, instrument_id: i64, market_code: &str, currency: &str) -> Option<Instrument> {
        self.inner
            .read()
            .instruments
            .iter()
            .find(|instrument| {
                instrument.instrument_id == instrument_id
                    && instrument.market_code == market_code
                    && instrument.currency == currency
            })
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.read().instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().instruments.is_empty()
    }
}
