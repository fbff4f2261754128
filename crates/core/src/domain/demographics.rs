use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One population slice of a post office's catchment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DemographicSegment {
    pub district: String,
    pub age_group: String,
    pub gender: String,
    pub occupation: String,
    pub income_level: String,
    pub population: f64,
}

/// Population breakdown keyed by post office, in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DemographicsTable {
    segments: BTreeMap<String, Vec<DemographicSegment>>,
}

impl DemographicsTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, post_office: impl Into<String>, segment: DemographicSegment) {
        self.segments.entry(post_office.into()).or_default().push(segment);
    }

    pub fn segments(&self, post_office: &str) -> &[DemographicSegment] {
        self.segments.get(post_office).map(Vec::as_slice).unwrap_or_default()
    }

    /// District of the first segment recorded for the post office.
    pub fn district_of(&self, post_office: &str) -> Option<&str> {
        self.segments(post_office).first().map(|segment| segment.district.as_str())
    }

    pub fn post_office_count(&self) -> usize {
        self.segments.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DemographicSegment])> {
        self.segments.iter().map(|(post_office, segments)| (post_office.as_str(), segments.as_slice()))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropCalendar {
    pub crop: String,
    pub sowing_month: u32,
    pub harvest_month: u32,
}

impl CropCalendar {
    /// Inclusive and within one calendar year; a window sown after its harvest
    /// month is never in season.
    pub fn in_season(&self, month: u32) -> bool {
        (self.sowing_month..=self.harvest_month).contains(&month)
    }

    pub fn is_harvest(&self, month: u32) -> bool {
        self.harvest_month == month
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CropTable {
    crops: BTreeMap<String, Vec<CropCalendar>>,
}

impl CropTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, district: impl Into<String>, crop: CropCalendar) {
        self.crops.entry(district.into()).or_default().push(crop);
    }

    pub fn for_district(&self, district: &str) -> &[CropCalendar] {
        self.crops.get(district).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn district_count(&self) -> usize {
        self.crops.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[CropCalendar])> {
        self.crops.iter().map(|(district, crops)| (district.as_str(), crops.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::{CropCalendar, DemographicSegment, DemographicsTable};

    fn crop(sowing: u32, harvest: u32) -> CropCalendar {
        CropCalendar { crop: "Paddy".to_owned(), sowing_month: sowing, harvest_month: harvest }
    }

    #[test]
    fn season_window_is_inclusive() {
        let kharif = crop(6, 10);
        assert!(kharif.in_season(6));
        assert!(kharif.in_season(10));
        assert!(!kharif.in_season(11));
        assert!(kharif.is_harvest(10));
    }

    #[test]
    fn season_window_does_not_wrap_across_year_end() {
        let rabi = crop(11, 3);
        for month in 1..=12 {
            assert!(!rabi.in_season(month), "month {month}");
        }
        assert!(rabi.is_harvest(3));
    }

    #[test]
    fn district_comes_from_first_segment() {
        let mut table = DemographicsTable::new();
        for district in ["Ernakulam", "Thrissur"] {
            table.push(
                "Alpha SO",
                DemographicSegment {
                    district: district.to_owned(),
                    age_group: "18-30".to_owned(),
                    gender: "Female".to_owned(),
                    occupation: "Farmer".to_owned(),
                    income_level: "2".to_owned(),
                    population: 100.0,
                },
            );
        }

        assert_eq!(table.district_of("Alpha SO"), Some("Ernakulam"));
        assert_eq!(table.segments("Alpha SO").len(), 2);
        assert!(table.segments("Beta BO").is_empty());
        assert!(table.district_of("Beta BO").is_none());
    }
}
