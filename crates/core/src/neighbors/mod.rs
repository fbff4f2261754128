use serde::{Deserialize, Serialize};

use crate::domain::features::FeatureTable;
use crate::errors::{ApplicationError, DomainError};

pub const DEFAULT_NEIGHBOR_COUNT: usize = 5;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub post_office: String,
    pub distance: f64,
}

/// Nearest post offices within the target's cluster, closest first.
///
/// The search asks for `count + 1` candidates so that the target's own zero-distance
/// entry can be dropped. Small clusters yield fewer neighbors; equal distances keep
/// table order.
pub fn find_similar_post_offices(
    features: &FeatureTable,
    post_office: &str,
    count: usize,
) -> Result<Vec<Neighbor>, ApplicationError> {
    let target = features
        .find(post_office)
        .ok_or_else(|| DomainError::PostOfficeNotFound(post_office.to_owned()))?;

    let mut candidates: Vec<Neighbor> = features
        .cluster_members(&target.cluster_label)
        .map(|row| Neighbor {
            post_office: row.post_office.clone(),
            distance: euclidean(&target.numeric, &row.numeric),
        })
        .collect();
    candidates.sort_by(|left, right| left.distance.total_cmp(&right.distance));
    candidates.truncate(count + 1);
    candidates.retain(|candidate| candidate.post_office != post_office);
    candidates.truncate(count);

    Ok(candidates)
}

fn euclidean(left: &[f64], right: &[f64]) -> f64 {
    left.iter().zip(right).map(|(a, b)| (a - b).powi(2)).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::find_similar_post_offices;
    use crate::domain::features::{FeatureRow, FeatureTable};
    use crate::errors::{ApplicationError, DomainError};

    fn table() -> FeatureTable {
        let rows = [
            ("Alpha SO", "0", [0.0, 0.0]),
            ("Beta BO", "0", [3.0, 4.0]),
            ("Gamma BO", "0", [1.0, 0.0]),
            ("Delta BO", "1", [0.1, 0.1]),
            ("Epsilon BO", "0", [0.0, 1.0]),
        ];
        FeatureTable::new(
            vec!["x".to_owned(), "y".to_owned()],
            rows.iter()
                .map(|(name, cluster, values)| FeatureRow {
                    post_office: (*name).to_owned(),
                    cluster_label: (*cluster).to_owned(),
                    numeric: values.to_vec(),
                    attributes: BTreeMap::new(),
                })
                .collect(),
        )
        .expect("valid table")
    }

    #[test]
    fn stays_within_cluster_and_excludes_self() {
        let neighbors = find_similar_post_offices(&table(), "Alpha SO", 5).expect("neighbors");
        let names: Vec<_> = neighbors.iter().map(|n| n.post_office.as_str()).collect();

        assert_eq!(names, vec!["Gamma BO", "Epsilon BO", "Beta BO"]);
        assert!((neighbors[2].distance - 5.0).abs() < 1e-12);
    }

    #[test]
    fn equal_distances_keep_table_order() {
        let neighbors = find_similar_post_offices(&table(), "Alpha SO", 2).expect("neighbors");
        let names: Vec<_> = neighbors.iter().map(|n| n.post_office.as_str()).collect();
        assert_eq!(names, vec!["Gamma BO", "Epsilon BO"]);
    }

    #[test]
    fn singleton_cluster_has_no_neighbors() {
        let neighbors = find_similar_post_offices(&table(), "Delta BO", 5).expect("neighbors");
        assert!(neighbors.is_empty());
    }

    #[test]
    fn unknown_post_office_is_not_found() {
        let error = find_similar_post_offices(&table(), "Nowhere", 5).expect_err("missing");
        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::PostOfficeNotFound("Nowhere".to_owned()))
        );
    }
}
