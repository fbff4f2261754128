//! Static demographic affinity per scheme. Segments absent from a table weigh 0.
//!
//! Some tables are keyed by a generic product name (`UNMATCHED_KEYS`) that no
//! enrolled scheme carries, so those schemes rank with the neutral NBF of 1.

use crate::domain::scheme::SchemeFamily;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentWeights {
    pub age_group: &'static [(&'static str, f64)],
    pub gender: &'static [(&'static str, f64)],
    pub occupation: &'static [(&'static str, f64)],
    pub income: &'static [(&'static str, f64)],
}

impl SegmentWeights {
    const EMPTY: SegmentWeights = SegmentWeights { age_group: &[], gender: &[], occupation: &[], income: &[] };

    pub fn age_group(&self, value: &str) -> f64 {
        lookup(self.age_group, value)
    }

    pub fn gender(&self, value: &str) -> f64 {
        lookup(self.gender, value)
    }

    pub fn occupation(&self, value: &str) -> f64 {
        lookup(self.occupation, value)
    }

    pub fn income(&self, value: &str) -> f64 {
        lookup(self.income, value)
    }
}

fn lookup(table: &[(&str, f64)], value: &str) -> f64 {
    table.iter().find(|(key, _)| *key == value).map(|(_, weight)| *weight).unwrap_or(0.0)
}

pub const UNMATCHED_KEYS: [&str; 3] = [
    "15-Year Public Provident Fund (PPF)",
    "Convertible Whole Life Assurance",
    "Anticipated Endowment Assurance",
];

pub fn weight_table(family: SchemeFamily) -> &'static [(&'static str, SegmentWeights)] {
    match family {
        SchemeFamily::Savings => SAVINGS_WEIGHTS,
        SchemeFamily::Insurance => INSURANCE_WEIGHTS,
    }
}

pub fn scheme_weights(family: SchemeFamily, scheme: &str) -> Option<&'static SegmentWeights> {
    weight_table(family).iter().find(|(name, _)| *name == scheme).map(|(_, weights)| weights)
}

const SAVINGS_WEIGHTS: &[(&str, SegmentWeights)] = &[
    ("Post Office Savings Account (SB)", SegmentWeights::EMPTY),
    (
        "5-Year Post Office Recurring Deposit (RD)",
        SegmentWeights {
            age_group: &[("0-18", 0.05), ("19-35", 0.4), ("36-60", 0.45), ("60+", 0.1)],
            gender: &[],
            occupation: &[("Salaried Individual", 0.6), ("Business Owner", 0.4)],
            income: &[("2", 0.3), ("3", 0.7)],
        },
    ),
    (
        "Post Office Time Deposit Account (TD)",
        SegmentWeights {
            age_group: &[("0-18", 0.05), ("19-35", 0.3), ("36-60", 0.5), ("60+", 0.15)],
            gender: &[],
            occupation: &[("Salaried Individual", 0.6), ("Business Owner", 0.3), ("Retired", 0.1)],
            income: &[("2", 0.4), ("3", 0.6)],
        },
    ),
    (
        "Post Office Monthly Income Scheme (MIS)",
        SegmentWeights {
            age_group: &[("19-35", 0.2), ("36-60", 0.8)],
            gender: &[],
            occupation: &[("Business Owner", 0.3), ("Retired", 0.6)],
            income: &[("1", 0.4), ("2", 0.3), ("3", 0.3)],
        },
    ),
    (
        "Senior Citizen Savings Scheme (SCSS)",
        SegmentWeights {
            age_group: &[("60+", 1.0)],
            gender: &[],
            occupation: &[("Retired", 1.0)],
            income: &[("2", 0.5), ("3", 0.4)],
        },
    ),
    (
        "15-Year Public Provident Fund (PPF)",
        SegmentWeights {
            age_group: &[("19-35", 0.6), ("36-60", 0.35)],
            gender: &[],
            occupation: &[("Salaried Individual", 0.8), ("Business Owner", 0.2)],
            income: &[("1", 0.35), ("2", 0.25)],
        },
    ),
    (
        "National Savings Certificates (NSC)",
        SegmentWeights {
            age_group: &[("19-35", 0.4), ("36-60", 0.5)],
            gender: &[],
            occupation: &[("Salaried Individual", 0.6), ("Business Owner", 0.3)],
            income: &[("3", 0.7), ("4", 0.3)],
        },
    ),
    (
        "Sukanya Samriddhi Accounts (SSA)",
        SegmentWeights {
            age_group: &[("0-18", 1.0)],
            gender: &[("Female", 1.0)],
            occupation: &[("Student", 0.6)],
            income: &[("1", 0.5)],
        },
    ),
    (
        "Kisan Vikas Patra (KVP)",
        SegmentWeights {
            age_group: &[("0-18", 0.05), ("36-60", 0.7)],
            gender: &[],
            occupation: &[("Farmer", 1.0)],
            income: &[("2", 0.6), ("1", 0.4)],
        },
    ),
    (
        "Mahila Samman Savings Certificate",
        SegmentWeights {
            age_group: &[],
            gender: &[("Female", 1.0)],
            occupation: &[],
            income: &[("2", 0.4), ("3", 0.25)],
        },
    ),
];

const INSURANCE_WEIGHTS: &[(&str, SegmentWeights)] = &[
    (
        "Whole Life Assurance (Suraksha)",
        SegmentWeights {
            age_group: &[("0-18", 0.2), ("19-35", 1.0), ("36-60", 0.8), ("60+", 0.3)],
            gender: &[("Female", 0.9), ("Male", 1.0)],
            occupation: &[
                ("Student", 0.3),
                ("Retired", 0.5),
                ("Salaried Individual", 1.0),
                ("Farmer", 0.8),
                ("Business Owner", 0.9),
            ],
            income: &[("1", 0.4), ("2", 0.7), ("3", 1.0), ("4", 0.9)],
        },
    ),
    (
        "Convertible Whole Life Assurance",
        SegmentWeights {
            age_group: &[("0-18", 0.3), ("19-35", 1.0), ("36-60", 0.7), ("60+", 0.2)],
            gender: &[("Female", 1.0), ("Male", 1.0)],
            occupation: &[
                ("Student", 0.5),
                ("Retired", 0.4),
                ("Salaried Individual", 1.0),
                ("Farmer", 0.7),
                ("Business Owner", 0.9),
            ],
            income: &[("1", 0.3), ("2", 0.6), ("3", 1.0), ("4", 0.9)],
        },
    ),
    (
        "Endowment Assurance (Santosh)",
        SegmentWeights {
            age_group: &[("0-18", 0.2), ("19-35", 0.8), ("36-60", 1.0), ("60+", 0.5)],
            gender: &[("Female", 1.0), ("Male", 1.0)],
            occupation: &[
                ("Student", 0.3),
                ("Retired", 0.6),
                ("Salaried Individual", 1.0),
                ("Farmer", 0.7),
                ("Business Owner", 0.9),
            ],
            income: &[("1", 0.4), ("2", 0.7), ("3", 1.0), ("4", 0.9)],
        },
    ),
    (
        "Joint Life Assurance (Yugal Suraksha)",
        SegmentWeights {
            age_group: &[("0-18", 0.1), ("19-35", 1.0), ("36-60", 0.8), ("60+", 0.3)],
            gender: &[("Female", 1.0), ("Male", 1.0)],
            occupation: &[
                ("Student", 0.2),
                ("Retired", 0.5),
                ("Salaried Individual", 1.0),
                ("Farmer", 0.7),
                ("Business Owner", 0.9),
            ],
            income: &[("1", 0.4), ("2", 0.7), ("3", 1.0), ("4", 0.9)],
        },
    ),
    (
        "Anticipated Endowment Assurance",
        SegmentWeights {
            age_group: &[("0-18", 0.2), ("19-35", 0.8), ("36-60", 1.0), ("60+", 0.5)],
            gender: &[("Female", 1.0), ("Male", 1.0)],
            occupation: &[
                ("Student", 0.3),
                ("Retired", 0.6),
                ("Salaried Individual", 1.0),
                ("Farmer", 1.0),
                ("Business Owner", 0.9),
            ],
            income: &[("1", 0.4), ("2", 0.7), ("3", 1.0), ("4", 0.9)],
        },
    ),
    (
        "Whole Life Assurance (Gram Suraksha)",
        SegmentWeights {
            age_group: &[("0-18", 0.2), ("19-35", 1.0), ("36-60", 0.8), ("60+", 0.4)],
            gender: &[("Female", 0.9), ("Male", 1.0)],
            occupation: &[
                ("Student", 0.3),
                ("Retired", 0.5),
                ("Salaried Individual", 0.7),
                ("Farmer", 1.0),
                ("Business Owner", 0.8),
            ],
            income: &[("1", 1.0), ("2", 0.7), ("3", 0.4), ("4", 0.2)],
        },
    ),
    (
        "Convertible Whole Life Assurance (Gram Suvidha)",
        SegmentWeights {
            age_group: &[("0-18", 0.3), ("19-35", 1.0), ("36-60", 0.7), ("60+", 0.3)],
            gender: &[("Female", 0.9), ("Male", 1.0)],
            occupation: &[
                ("Student", 0.4),
                ("Retired", 0.5),
                ("Salaried Individual", 0.7),
                ("Farmer", 1.0),
                ("Business Owner", 0.9),
            ],
            income: &[("1", 1.0), ("2", 0.7), ("3", 0.4), ("4", 0.2)],
        },
    ),
    (
        "Endowment Assurance (Gram Santosh)",
        SegmentWeights {
            age_group: &[("0-18", 0.2), ("19-35", 0.8), ("36-60", 1.0), ("60+", 0.5)],
            gender: &[("Female", 0.9), ("Male", 1.0)],
            occupation: &[
                ("Student", 0.3),
                ("Retired", 0.6),
                ("Salaried Individual", 0.7),
                ("Farmer", 1.0),
                ("Business Owner", 0.8),
            ],
            income: &[("1", 0.8), ("2", 1.0), ("3", 0.6), ("4", 0.3)],
        },
    ),
    (
        "Anticipated Endowment Assurance (Gram Sumangal)",
        SegmentWeights {
            age_group: &[("0-18", 0.2), ("19-35", 0.8), ("36-60", 1.0), ("60+", 0.5)],
            gender: &[("Female", 0.9), ("Male", 1.0)],
            occupation: &[
                ("Student", 0.3),
                ("Retired", 0.6),
                ("Salaried Individual", 0.7),
                ("Farmer", 1.0),
                ("Business Owner", 0.8),
            ],
            income: &[("1", 0.7), ("2", 1.0), ("3", 0.6), ("4", 0.3)],
        },
    ),
];
