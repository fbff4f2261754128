use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Output order of the savings predictors.
pub const SAVINGS_SCHEMES: [&str; 10] = [
    "15-Year Public Provident Fund Account (PPF)",
    "5-Year Post Office Recurring Deposit (RD)",
    "Kisan Vikas Patra (KVP)",
    "Mahila Samman Savings Certificate",
    "National Savings Certificates (NSC)",
    "Post Office Monthly Income Scheme (MIS)",
    "Post Office Savings Account (SB)",
    "Post Office Time Deposit Account (TD)",
    "Senior Citizen Savings Scheme (SCSS)",
    "Sukanya Samriddhi Accounts (SSA)",
];

/// Output order of the insurance predictors.
pub const INSURANCE_SCHEMES: [&str; 10] = [
    "10 Years Rural PLI (Gram Priya)",
    "Anticipated Endowment Assurance (Gram Sumangal)",
    "Anticipated Endowment Assurance (Sumangal)",
    "Convertible Whole Life Assurance (Gram Suvidha)",
    "Convertible Whole Life Assurance (Suvidha)",
    "Endowment Assurance (Gram Santosh)",
    "Endowment Assurance (Santosh)",
    "Joint Life Assurance (Yugal Suraksha)",
    "Whole Life Assurance (Gram Suraksha)",
    "Whole Life Assurance (Suraksha)",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemeFamily {
    Savings,
    Insurance,
}

impl SchemeFamily {
    pub const ALL: [SchemeFamily; 2] = [SchemeFamily::Savings, SchemeFamily::Insurance];

    pub fn schemes(self) -> &'static [&'static str] {
        match self {
            Self::Savings => &SAVINGS_SCHEMES,
            Self::Insurance => &INSURANCE_SCHEMES,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Savings => "savings",
            Self::Insurance => "insurance",
        }
    }
}

impl fmt::Display for SchemeFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Most recent enrollment count per post office and scheme.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnrollmentTable {
    records: BTreeMap<String, BTreeMap<String, f64>>,
}

impl EnrollmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, post_office: impl Into<String>, scheme: impl Into<String>, count: f64) {
        self.records.entry(post_office.into()).or_default().insert(scheme.into(), count);
    }

    pub fn for_post_office(&self, post_office: &str) -> Option<&BTreeMap<String, f64>> {
        self.records.get(post_office)
    }

    pub fn post_office_count(&self) -> usize {
        self.records.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeMap<String, f64>)> {
        self.records.iter().map(|(post_office, records)| (post_office.as_str(), records))
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
