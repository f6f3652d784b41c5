//! Synthesized demo dataset for degraded mode.
//!
//! Derived from the seed asset on every call and never written anywhere.

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::warn;
use uuid::Uuid;

use beadstock_core::ItemId;
use beadstock_inventory::{InventoryItem, ItemCode, Quantity};

use crate::seed::SeedSource;

/// At most this many seed codes are turned into demo items.
pub const DEMO_ITEM_LIMIT: usize = 50;

/// Code that always shows a fixed stock level in demo data.
pub const BOOTSTRAP_CODE: &str = "A1";
pub const BOOTSTRAP_QUANTITY: i64 = 10;

/// Upper bound (inclusive) of the random demo quantities.
pub const DEMO_MAX_QUANTITY: i64 = 20;

/// Used when the seed asset is missing.
const FALLBACK_SAMPLE: [(&str, i64); 5] = [("A1", 10), ("A2", 5), ("B1", 0), ("B2", 3), ("C1", 8)];

#[derive(Debug, Clone)]
pub struct DemoGenerator {
    seed: SeedSource,
    rng_seed: Option<u64>,
}

impl DemoGenerator {
    pub fn new(seed: SeedSource) -> Self {
        Self {
            seed,
            rng_seed: None,
        }
    }

    /// Fix the RNG seed so repeated calls produce identical quantities.
    pub fn with_rng_seed(mut self, rng_seed: Option<u64>) -> Self {
        self.rng_seed = rng_seed;
        self
    }

    /// Demo items ordered by code.
    ///
    /// Ids are synthetic and stable per position (`00000000-...-0001` for the
    /// first code), so a demo id stays valid across calls while the seed file
    /// is unchanged.
    pub fn generate(&self) -> Vec<InventoryItem> {
        let codes = match self.seed.read_codes() {
            Ok(Some(codes)) => codes,
            Ok(None) => return fallback_sample(),
            Err(e) => {
                warn!(error = %e, "seed asset unreadable; using built-in demo sample");
                return fallback_sample();
            }
        };

        let mut rng = match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let now = Utc::now();
        let mut items: Vec<InventoryItem> = codes
            .iter()
            .take(DEMO_ITEM_LIMIT)
            .filter_map(|raw| ItemCode::parse(raw).ok())
            .enumerate()
            .map(|(idx, code)| {
                let quantity = if code.as_str() == BOOTSTRAP_CODE {
                    BOOTSTRAP_QUANTITY
                } else {
                    rng.gen_range(0..=DEMO_MAX_QUANTITY)
                };
                InventoryItem::new(demo_id(idx), code, Quantity::normalized(quantity), now)
            })
            .collect();

        items.sort_by(|a, b| a.code().cmp(b.code()));
        items.dedup_by(|a, b| a.code() == b.code());
        items
    }
}

fn demo_id(idx: usize) -> ItemId {
    ItemId::from_uuid(Uuid::from_u128(idx as u128 + 1))
}

fn fallback_sample() -> Vec<InventoryItem> {
    let now = Utc::now();
    FALLBACK_SAMPLE
        .iter()
        .enumerate()
        .filter_map(|(idx, (code, quantity))| {
            let code = ItemCode::parse(code).ok()?;
            Some(InventoryItem::new(demo_id(idx), code, Quantity::normalized(*quantity), now))
        })
        .collect()
}
