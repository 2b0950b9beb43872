//! Sync orchestration: wires configuration, upstream sources and the
//! reconciliation passes together, and records completion times.
//!
//! The passes must run in order (FlavorDB, then foods, then content) for the
//! FooDB passes to find the FlavorDB ingredients. Each function here runs one
//! pass and can be called on its own; [`run_all`] runs the three in order and
//! hands the foods pass's [`FoodIndex`] straight to the content pass.

use anyhow::Context;
use chrono::Utc;
use diesel::SqliteConnection;
use flavor_ingestor::io::ndjson;
use flavor_ingestor::models::foodb::{CompoundRecord, ContentRecord, FoodRecord};
use flavor_ingestor::providers::cache::{CachedSource, ResponseCache};
use flavor_ingestor::providers::flavordb_rest::FlavorDbRestProvider;
use serde::Serialize;
use tracing::info;

use crate::aggregate::{aggregate_content, load_compound_index};
use crate::config::EngineConfig;
use crate::kv;
use crate::reconcile::SyncReport;
use crate::reconcile::flavordb::sync_flavordb;
use crate::reconcile::foodb::{FoodIndex, load_food_index, reconcile_foods};

/// Reports of a full run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FullSyncReport {
    /// FlavorDB pass.
    pub flavordb: SyncReport,
    /// FooDB foods pass.
    pub foods: SyncReport,
    /// FooDB content pass.
    pub content: SyncReport,
}

/// Runs the FlavorDB pass against the configured REST endpoint, replaying
/// cached answers from `cache_dir` where present.
pub async fn run_flavordb(
    conn: &mut SqliteConnection,
    cfg: &EngineConfig,
) -> anyhow::Result<SyncReport> {
    let provider = FlavorDbRestProvider::with_params(cfg.flavordb.rest_params()?)
        .context("build FlavorDB provider")?;
    let source = CachedSource::new(provider, ResponseCache::new(&cfg.flavordb.cache_dir));

    let ids = cfg.flavordb.entity_ids();
    info!(first = ids.start, end = ids.end, "starting FlavorDB pass");
    let report = sync_flavordb(conn, &source, ids)
        .await
        .context("FlavorDB pass")?;

    kv::record_sync(conn, kv::LAST_SYNC_FLAVORDB, Utc::now())?;
    Ok(report)
}

/// Runs the foods pass over `Food.json`.
///
/// Returns the report and the food index for the content pass.
pub fn run_foods(
    conn: &mut SqliteConnection,
    cfg: &EngineConfig,
) -> anyhow::Result<(SyncReport, FoodIndex)> {
    let path = cfg.foodb.food_file();
    let lines = ndjson::open::<FoodRecord>(&path)
        .with_context(|| format!("open {}", path.display()))?;
    let outcome = reconcile_foods(conn, lines).context("FooDB foods pass")?;

    kv::record_sync(conn, kv::LAST_SYNC_FOODB_FOODS, Utc::now())?;
    Ok((outcome.report, outcome.food_index))
}

/// Runs the content pass over `Content.json`.
///
/// Without a `foods` index from a preceding foods pass, the index is rebuilt
/// from `Food.json`.
pub fn run_content(
    conn: &mut SqliteConnection,
    cfg: &EngineConfig,
    foods: Option<FoodIndex>,
) -> anyhow::Result<SyncReport> {
    let foods = match foods {
        Some(index) => index,
        None => {
            let path = cfg.foodb.food_file();
            let lines = ndjson::open::<FoodRecord>(&path)
                .with_context(|| format!("open {}", path.display()))?;
            load_food_index(lines)
        }
    };

    let path = cfg.foodb.compound_file();
    let compounds = load_compound_index(
        ndjson::open::<CompoundRecord>(&path)
            .with_context(|| format!("open {}", path.display()))?,
    );
    info!(
        foods = foods.len(),
        compounds = compounds.len(),
        "loaded FooDB indexes"
    );

    let path = cfg.foodb.content_file();
    let lines = ndjson::open::<ContentRecord>(&path)
        .with_context(|| format!("open {}", path.display()))?;
    let report = aggregate_content(conn, lines, &foods, &compounds)
        .context("FooDB content pass")?;

    kv::record_sync(conn, kv::LAST_SYNC_FOODB_CONTENT, Utc::now())?;
    Ok(report)
}

/// Runs every pass in order.
pub async fn run_all(
    conn: &mut SqliteConnection,
    cfg: &EngineConfig,
) -> anyhow::Result<FullSyncReport> {
    let flavordb = run_flavordb(conn, cfg).await?;
    let (foods, food_index) = run_foods(conn, cfg)?;
    let content = run_content(conn, cfg, Some(food_index))?;
    Ok(FullSyncReport {
        flavordb,
        foods,
        content,
    })
}
