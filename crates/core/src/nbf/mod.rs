pub mod weights;

use std::collections::BTreeMap;

use crate::domain::demographics::{CropCalendar, CropTable, DemographicSegment, DemographicsTable};
use crate::domain::scheme::SchemeFamily;
use crate::errors::{ApplicationError, DomainError};

pub use weights::{scheme_weights, weight_table, SegmentWeights};

pub const DEMOGRAPHIC_WEIGHT: f64 = 0.7;
pub const AGRICULTURE_WEIGHT: f64 = 0.3;
pub const SOWING_SCORE: f64 = 0.6;
pub const HARVEST_SCORE: f64 = 0.4;

/// Population-weighted affinity of a post office's catchment for one scheme.
pub fn demographic_score(segments: &[DemographicSegment], weights: &SegmentWeights) -> f64 {
    segments
        .iter()
        .map(|segment| {
            let affinity = weights.age_group(&segment.age_group)
                + weights.gender(&segment.gender)
                + weights.occupation(&segment.occupation)
                + weights.income(&normalize_income(&segment.income_level));
            segment.population * affinity
        })
        .sum()
}

/// Seasonal activity of a district's crops in `month`.
pub fn agriculture_score(crops: &[CropCalendar], month: u32) -> f64 {
    crops
        .iter()
        .map(|crop| {
            let mut score = 0.0;
            if crop.in_season(month) {
                score += SOWING_SCORE;
            }
            if crop.is_harvest(month) {
                score += HARVEST_SCORE;
            }
            score
        })
        .sum()
}

/// NBF per weighted scheme of `family`. Schemes without a weight table under
/// their exact name are absent.
pub fn calculate_nbf(
    demographics: &DemographicsTable,
    crops: &CropTable,
    post_office: &str,
    family: SchemeFamily,
    current_month: u32,
) -> Result<BTreeMap<String, f64>, ApplicationError> {
    let segments = demographics.segments(post_office);
    let district = demographics
        .district_of(post_office)
        .ok_or_else(|| DomainError::MissingDemographics(post_office.to_owned()))?;
    let agriculture = agriculture_score(crops.for_district(district), current_month);

    Ok(weight_table(family)
        .iter()
        .filter(|(scheme, _)| family.schemes().contains(scheme))
        .map(|(scheme, weights)| {
            let demographic = demographic_score(segments, weights);
            (
                (*scheme).to_owned(),
                DEMOGRAPHIC_WEIGHT * demographic + AGRICULTURE_WEIGHT * agriculture,
            )
        })
        .collect())
}

/// Income bands arrive as `2`, `2.0` or ` 2 `; weight tables key on the integer form.
fn normalize_income(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.parse::<f64>() {
        Ok(value) if value.fract() == 0.0 => format!("{}", value as i64),
        _ => trimmed.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::{agriculture_score, calculate_nbf, demographic_score, normalize_income};
    use crate::domain::demographics::{
        CropCalendar, CropTable, DemographicSegment, DemographicsTable,
    };
    use crate::domain::scheme::SchemeFamily;
    use crate::errors::{ApplicationError, DomainError};
    use crate::nbf::weights::scheme_weights;

    fn segment(age: &str, gender: &str, occupation: &str, income: &str, population: f64) -> DemographicSegment {
        DemographicSegment {
            district: "Ernakulam".to_owned(),
            age_group: age.to_owned(),
            gender: gender.to_owned(),
            occupation: occupation.to_owned(),
            income_level: income.to_owned(),
            population,
        }
    }

    #[test]
    fn demographic_score_sums_population_weighted_affinity() {
        let weights =
            scheme_weights(SchemeFamily::Savings, "Kisan Vikas Patra (KVP)").expect("weights");
        let segments = vec![
            segment("36-60", "Male", "Farmer", "2.0", 100.0),
            segment("60+", "Female", "Retired", "4", 50.0),
        ];

        // 100 * (0.7 + 0 + 1.0 + 0.6) + 50 * 0
        let score = demographic_score(&segments, weights);
        assert!((score - 230.0).abs() < 1e-9);
    }

    #[test]
    fn demographic_score_is_non_negative_for_non_negative_population() {
        let segments = vec![segment("19-35", "Female", "Student", "1", 10.0)];
        for family in SchemeFamily::ALL {
            for (_, weights) in super::weight_table(family) {
                assert!(demographic_score(&segments, weights) >= 0.0);
            }
        }
    }

    #[test]
    fn agriculture_score_adds_season_and_harvest() {
        let crops = vec![
            CropCalendar { crop: "Paddy".to_owned(), sowing_month: 6, harvest_month: 10 },
            CropCalendar { crop: "Wheat".to_owned(), sowing_month: 11, harvest_month: 3 },
        ];
        assert!((agriculture_score(&crops, 10) - 1.0).abs() < 1e-12);
        assert!((agriculture_score(&crops, 7) - 0.6).abs() < 1e-12);
        assert_eq!(agriculture_score(&crops, 5), 0.0);
    }

    #[test]
    fn winter_crop_only_scores_its_harvest_month() {
        let wheat = vec![CropCalendar { crop: "Wheat".to_owned(), sowing_month: 11, harvest_month: 3 }];
        for month in [11, 12, 1, 2] {
            assert_eq!(agriculture_score(&wheat, month), 0.0, "month {month}");
        }
        assert!((agriculture_score(&wheat, 3) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn nbf_blends_demographic_and_agriculture_scores() {
        let mut demographics = DemographicsTable::new();
        demographics.push("Alpha SO", segment("0-18", "Female", "Student", "1", 10.0));
        let mut crops = CropTable::new();
        crops.push(
            "Ernakulam",
            CropCalendar { crop: "Paddy".to_owned(), sowing_month: 6, harvest_month: 10 },
        );

        let nbf = calculate_nbf(&demographics, &crops, "Alpha SO", SchemeFamily::Savings, 10)
            .expect("nbf");

        // SSA: 10 * (1.0 + 1.0 + 0.6 + 0.5) = 31; agriculture = 1.0
        let ssa = nbf["Sukanya Samriddhi Accounts (SSA)"];
        assert!((ssa - (0.7 * 31.0 + 0.3 * 1.0)).abs() < 1e-9);
        let sb = nbf["Post Office Savings Account (SB)"];
        assert!((sb - 0.3).abs() < 1e-9);
        assert_eq!(nbf.len(), 9);
    }

    #[test]
    fn generic_weight_keys_leave_their_schemes_unscored() {
        let mut demographics = DemographicsTable::new();
        demographics.push("Alpha SO", segment("19-35", "Male", "Salaried Individual", "1", 100.0));
        let crops = CropTable::new();

        let savings = calculate_nbf(&demographics, &crops, "Alpha SO", SchemeFamily::Savings, 1)
            .expect("savings nbf");
        assert!(!savings.contains_key("15-Year Public Provident Fund Account (PPF)"));
        assert!(!savings.contains_key("15-Year Public Provident Fund (PPF)"));

        let insurance = calculate_nbf(&demographics, &crops, "Alpha SO", SchemeFamily::Insurance, 1)
            .expect("insurance nbf");
        assert!(!insurance.contains_key("Convertible Whole Life Assurance (Suvidha)"));
        assert!(!insurance.contains_key("Anticipated Endowment Assurance (Sumangal)"));
        assert!(insurance.contains_key("Convertible Whole Life Assurance (Gram Suvidha)"));
        assert!(insurance.keys().all(|scheme| SchemeFamily::Insurance.schemes().contains(&scheme.as_str())));
    }

    #[test]
    fn missing_demographics_is_reported() {
        let error = calculate_nbf(
            &DemographicsTable::new(),
            &CropTable::new(),
            "Nowhere",
            SchemeFamily::Insurance,
            1,
        )
        .expect_err("missing");
        assert_eq!(
            error,
            ApplicationError::Domain(DomainError::MissingDemographics("Nowhere".to_owned()))
        );
    }

    #[test]
    fn income_bands_normalize_to_integers() {
        assert_eq!(normalize_income("2.0"), "2");
        assert_eq!(normalize_income(" 3 "), "3");
        assert_eq!(normalize_income("High"), "High");
    }
}
