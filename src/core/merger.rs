use crate::domain::model::{Catalog, EnrichedRecommendation, RankedAtm, RecommendationDecision};
use crate::utils::error::FinderError;
use std::collections::{HashMap, HashSet};

/// 將評分結果合併回目錄與距離
///
/// 只保留 `recommended == true` 的決策，並維持服務回傳的順序。
/// 目錄中找不到的 id 會記錄後丟棄，不會補造資料；
/// 同一個 id 重複出現時只採用第一筆。
pub fn merge(
    catalog: &Catalog,
    shortlist: &[RankedAtm],
    decisions: &[RecommendationDecision],
) -> Vec<EnrichedRecommendation> {
    let distances: HashMap<&str, f64> = shortlist
        .iter()
        .map(|ranked| (ranked.atm_id.as_str(), ranked.distance_meters))
        .collect();

    let mut merged = Vec::new();
    let mut seen = HashSet::new();

    for decision in decisions.iter().filter(|d| d.recommended) {
        let Some(atm) = catalog.get(&decision.atm_id) else {
            let mismatch = FinderError::JoinMismatch {
                atm_id: decision.atm_id.clone(),
            };
            tracing::warn!("⚠️ Dropping recommendation: {}", mismatch);
            continue;
        };

        if !seen.insert(decision.atm_id.as_str()) {
            tracing::warn!("⚠️ Duplicate decision for {} ignored", decision.atm_id);
            continue;
        }

        merged.push(EnrichedRecommendation {
            atm: atm.clone(),
            distance_meters: distances.get(decision.atm_id.as_str()).copied(),
            rating: decision.rating,
            currency_available: decision.currency_available,
        });
    }

    tracing::debug!(
        "Merged {} of {} decisions into recommendations",
        merged.len(),
        decisions.len()
    );

    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AtmRecord, GeoPoint};

    fn catalog() -> Catalog {
        let records = ["A", "B", "D"]
            .iter()
            .enumerate()
            .map(|(i, id)| AtmRecord {
                atm_id: id.to_string(),
                name: format!("ATM {}", id),
                address: format!("Atatürk Blv. {}", i + 1),
                location: GeoPoint::new(41.0 + i as f64 * 0.01, 29.0).unwrap(),
            })
            .collect();
        Catalog::from_records(records).unwrap()
    }

    fn ranked(id: &str, distance_meters: f64) -> RankedAtm {
        RankedAtm {
            atm_id: id.to_string(),
            distance_meters,
        }
    }

    fn decision(id: &str, recommended: bool, rating: Option<f64>) -> RecommendationDecision {
        RecommendationDecision {
            atm_id: id.to_string(),
            recommended,
            rating,
            currency_available: None,
        }
    }

    #[test]
    fn test_unknown_id_is_dropped() {
        let shortlist = vec![ranked("A", 100.0), ranked("B", 200.0)];
        let decisions = vec![decision("A", true, Some(4.5)), decision("C", true, None)];

        let merged = merge(&catalog(), &shortlist, &decisions);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].atm.atm_id, "A");
        assert_eq!(merged[0].distance_meters, Some(100.0));
        assert_eq!(merged[0].rating, Some(4.5));
    }

    #[test]
    fn test_not_recommended_is_filtered() {
        let shortlist = vec![ranked("A", 100.0), ranked("B", 200.0)];
        let decisions = vec![decision("A", false, Some(1.0)), decision("B", true, None)];

        let merged = merge(&catalog(), &shortlist, &decisions);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].atm.atm_id, "B");
    }

    #[test]
    fn test_decision_order_is_preserved() {
        let shortlist = vec![ranked("A", 100.0), ranked("B", 200.0)];
        let decisions = vec![decision("B", true, Some(5.0)), decision("A", true, Some(3.0))];

        let merged = merge(&catalog(), &shortlist, &decisions);

        let ids: Vec<&str> = merged.iter().map(|m| m.atm.atm_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A"]);
    }

    #[test]
    fn test_catalog_entry_outside_shortlist_has_no_distance() {
        let shortlist = vec![ranked("A", 100.0)];
        let decisions = vec![decision("D", true, None)];

        let merged = merge(&catalog(), &shortlist, &decisions);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].atm.address, "Atatürk Blv. 3");
        assert_eq!(merged[0].distance_meters, None);
    }

    #[test]
    fn test_duplicate_decision_keeps_first() {
        let shortlist = vec![ranked("A", 100.0), ranked("B", 200.0)];
        let decisions = vec![
            decision("A", true, Some(4.5)),
            decision("B", true, None),
            decision("A", true, Some(1.0)),
        ];

        let merged = merge(&catalog(), &shortlist, &decisions);

        let ids: Vec<&str> = merged.iter().map(|m| m.atm.atm_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(merged[0].rating, Some(4.5));
    }

    #[test]
    fn test_every_result_exists_in_catalog() {
        let catalog = catalog();
        let shortlist = vec![ranked("A", 1.0), ranked("B", 2.0)];
        let decisions = vec![
            decision("X", true, None),
            decision("A", true, None),
            decision("Y", true, None),
            decision("B", true, None),
        ];

        let merged = merge(&catalog, &shortlist, &decisions);

        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|m| catalog.contains(&m.atm.atm_id)));
    }
}
