use crate::core::distance::distance;
use crate::domain::model::{AtmRecord, GeoPoint, RankedAtm};
use crate::utils::error::{FinderError, Result};

/// 依距離排序並取前 k 台 ATM
///
/// 排序為穩定排序，距離相同時保留目錄順序。
pub fn rank_nearest(user: GeoPoint, catalog: &[AtmRecord], k: usize) -> Result<Vec<RankedAtm>> {
    if catalog.is_empty() {
        return Err(FinderError::invalid_input("cannot rank an empty catalog"));
    }
    if k == 0 {
        return Err(FinderError::invalid_input("shortlist size must be at least 1"));
    }

    let mut ranked: Vec<RankedAtm> = catalog
        .iter()
        .map(|atm| RankedAtm {
            atm_id: atm.atm_id.clone(),
            distance_meters: distance(user, atm.location),
        })
        .collect();

    ranked.sort_by(|a, b| a.distance_meters.total_cmp(&b.distance_meters));
    ranked.truncate(k);

    tracing::debug!(
        "Ranked {} ATMs around {}, keeping {}",
        catalog.len(),
        user,
        ranked.len()
    );

    Ok(ranked)
}
