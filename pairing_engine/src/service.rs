//! Thread-safe entry point for the read path.
//!
//! ```no_run
//! # fn run() -> anyhow::Result<()> {
//! use pairing_engine::config::EngineConfig;
//! use pairing_engine::service::PairingService;
//!
//! let service = PairingService::from_config(&EngineConfig::default())?;
//! let result = service.suggest(&["12", "40"])?;
//! println!("{:.1}% match", result.match_score);
//! # Ok(()) }
//! ```

use crate::config::EngineConfig;
use crate::db::pool::{SqlitePool, build_pool};
use crate::library::{Shelf, ingredient_library};
use crate::ranker::{PairingResult, RankerError, RankingLimits, Selection, suggest_pairings};

/// Ranker and library over a connection pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PairingService {
    pool: SqlitePool,
    limits: RankingLimits,
}

impl PairingService {
    /// Wraps an existing pool.
    pub fn new(pool: SqlitePool, limits: RankingLimits) -> Self {
        Self { pool, limits }
    }

    /// Builds the pool from `cfg.database_url` and `cfg.pool_size`.
    pub fn from_config(cfg: &EngineConfig) -> anyhow::Result<Self> {
        let pool = build_pool(&cfg.database_url, cfg.pool_size)?;
        Ok(Self::new(pool, cfg.ranking))
    }

    /// List caps in use.
    pub fn limits(&self) -> &RankingLimits {
        &self.limits
    }

    /// Validates raw ids and ranks pairings for them.
    pub fn suggest<S: AsRef<str>>(&self, raw_ids: &[S]) -> Result<PairingResult, RankerError> {
        let selection = Selection::parse(raw_ids)?;
        self.suggest_selection(&selection)
    }

    /// Ranks pairings for an already validated selection.
    pub fn suggest_selection(&self, selection: &Selection) -> Result<PairingResult, RankerError> {
        let mut conn = self.pool.get()?;
        suggest_pairings(&mut conn, selection, &self.limits)
    }

    /// Category shelves; see [`ingredient_library`].
    pub fn library(&self, with_data_only: bool) -> Result<Vec<Shelf>, RankerError> {
        let mut conn = self.pool.get()?;
        Ok(ingredient_library(&mut conn, with_data_only)?)
    }
}
