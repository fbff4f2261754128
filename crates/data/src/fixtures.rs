use std::collections::BTreeMap;
use std::path::Path;

use postwise_core::domain::dataset::{Dataset, FamilyData, ModelColumns};
use postwise_core::domain::demographics::{
    CropCalendar, CropTable, DemographicSegment, DemographicsTable,
};
use postwise_core::domain::district::{DistrictIndicators, DistrictTable};
use postwise_core::domain::features::{FeatureRow, FeatureTable};
use postwise_core::domain::scheme::{EnrollmentTable, SchemeFamily};
use postwise_core::domain::series::{MonthlyRecord, TimeSeriesTable};
use postwise_core::ensemble::{
    Activation, BranchNetwork, DenseLayer, DenseNetwork, FamilyModels, ModelBundle,
    RecurrentEncoder,
};
use postwise_core::projections::DEFAULT_RATES;
use serde_json::json;

use crate::error::DataError;
use crate::writer::{write_dataset, write_models};

/// Months of history per demo post office.
pub const DEMO_HISTORY_LEN: u32 = 24;
/// Window length the demo networks are shaped for.
pub const DEMO_WINDOW_MONTHS: usize = 23;
pub const DEMO_PAST_COLUMN: &str = "Month_24";

struct DemoOffice {
    name: &'static str,
    cluster: &'static str,
    district: &'static str,
    population: f64,
    literacy: f64,
    income: f64,
    branches: f64,
}

const DEMO_OFFICES: [DemoOffice; 8] = [
    DemoOffice {
        name: "Aluva SO",
        cluster: "0",
        district: "Ernakulam",
        population: 24000.0,
        literacy: 95.2,
        income: 18500.0,
        branches: 12.0,
    },
    DemoOffice {
        name: "Kalamassery SO",
        cluster: "0",
        district: "Ernakulam",
        population: 26500.0,
        literacy: 96.1,
        income: 21000.0,
        branches: 14.0,
    },
    DemoOffice {
        name: "Edappally SO",
        cluster: "0",
        district: "Ernakulam",
        population: 31000.0,
        literacy: 97.4,
        income: 26500.0,
        branches: 19.0,
    },
    DemoOffice {
        name: "Angamaly SO",
        cluster: "0",
        district: "Ernakulam",
        population: 21000.0,
        literacy: 94.0,
        income: 16800.0,
        branches: 9.0,
    },
    DemoOffice {
        name: "Chalakudy SO",
        cluster: "1",
        district: "Thrissur",
        population: 15500.0,
        literacy: 93.3,
        income: 12400.0,
        branches: 6.0,
    },
    DemoOffice {
        name: "Irinjalakuda SO",
        cluster: "1",
        district: "Thrissur",
        population: 17200.0,
        literacy: 94.8,
        income: 13900.0,
        branches: 7.0,
    },
    DemoOffice {
        name: "Kodungallur SO",
        cluster: "1",
        district: "Thrissur",
        population: 14100.0,
        literacy: 92.5,
        income: 11800.0,
        branches: 5.0,
    },
    DemoOffice {
        name: "Mala BO",
        cluster: "1",
        district: "Thrissur",
        population: 8200.0,
        literacy: 91.0,
        income: 9600.0,
        branches: 2.0,
    },
];

const FEATURE_COLUMNS: [&str; 4] =
    ["Population", "Literacy_Rate", "Avg_Monthly_Income", "Bank_Branches"];

const SAVINGS_SERIES_COLUMNS: [&str; 4] = ["Deposits", "Withdrawals", "New_Accounts", "Footfall"];
const INSURANCE_SERIES_COLUMNS: [&str; 4] = ["Premiums", "Claims", "New_Policies", "Footfall"];

const SEGMENTS: [(&str, &str, f64); 8] = [
    ("0-18", "Student", 0.14),
    ("0-18", "Student", 0.13),
    ("19-35", "Salaried Individual", 0.15),
    ("19-35", "Business Owner", 0.12),
    ("36-60", "Farmer", 0.16),
    ("36-60", "Salaried Individual", 0.12),
    ("60+", "Retired", 0.10),
    ("60+", "Retired", 0.08),
];

/// Small deterministic dataset: two clusters of four post offices in two districts,
/// with 24 months of history for both scheme families.
pub fn demo_dataset() -> Dataset {
    let rows = DEMO_OFFICES
        .iter()
        .map(|office| FeatureRow {
            post_office: office.name.to_owned(),
            cluster_label: office.cluster.to_owned(),
            numeric: vec![office.population, office.literacy, office.income, office.branches],
            attributes: BTreeMap::from([
                ("District".to_owned(), office.district.to_owned()),
                ("State".to_owned(), "Kerala".to_owned()),
            ]),
        })
        .collect();
    let features = FeatureTable::new(FEATURE_COLUMNS.map(str::to_owned).to_vec(), rows)
        .unwrap_or_default();

    Dataset {
        features,
        savings: demo_family(SchemeFamily::Savings),
        insurance: demo_family(SchemeFamily::Insurance),
        demographics: demo_demographics(),
        crops: demo_crops(),
        districts: demo_districts(),
        scheme_details: demo_scheme_details(),
    }
}

fn demo_family(family: SchemeFamily) -> FamilyData {
    let (columns, salt) = match family {
        SchemeFamily::Savings => (SAVINGS_SERIES_COLUMNS, 0),
        SchemeFamily::Insurance => (INSURANCE_SERIES_COLUMNS, 3),
    };

    let mut series = TimeSeriesTable::new(columns.map(str::to_owned).to_vec());
    let mut past_enrollment = EnrollmentTable::new();
    for (index, office) in DEMO_OFFICES.iter().enumerate() {
        let base = (office.population / 100.0).round();
        for month in 1..=DEMO_HISTORY_LEN {
            let values = (0..columns.len())
                .map(|column| {
                    let trend = base * (100 + 2 * month as usize) as f64 / 100.0;
                    let season = ((month as usize * 7 + index * 3 + column + salt) % 5) as f64;
                    (trend / (column + 1) as f64).round() + season
                })
                .collect();
            series
                .push(office.name, MonthlyRecord { month: month.to_string(), values })
                .unwrap_or_default();
        }
        for (scheme_index, scheme) in family.schemes().iter().enumerate() {
            let count = if (index + scheme_index + salt) % 9 == 0 {
                0.0
            } else {
                (((index * 13 + scheme_index * 7 + salt) % 17) * 5 + 10) as f64
            };
            past_enrollment.insert(office.name, *scheme, count);
        }
    }

    let (dense, branch) = match family {
        SchemeFamily::Savings => (["Deposits", "New_Accounts"], ["Deposits", "Withdrawals"]),
        SchemeFamily::Insurance => (["Premiums", "New_Policies"], ["Premiums", "Claims"]),
    };
    FamilyData {
        series,
        columns: ModelColumns {
            dense: dense.map(str::to_owned).to_vec(),
            branch: branch.map(str::to_owned).to_vec(),
        },
        past_enrollment,
    }
}

fn demo_demographics() -> DemographicsTable {
    let mut table = DemographicsTable::new();
    for (index, office) in DEMO_OFFICES.iter().enumerate() {
        for (segment_index, (age_group, occupation, share)) in SEGMENTS.iter().enumerate() {
            let gender = if segment_index % 2 == 0 { "Female" } else { "Male" };
            table.push(
                office.name,
                DemographicSegment {
                    district: office.district.to_owned(),
                    age_group: (*age_group).to_owned(),
                    gender: gender.to_owned(),
                    occupation: (*occupation).to_owned(),
                    income_level: ((index + segment_index) % 4 + 1).to_string(),
                    population: (office.population * share).round(),
                },
            );
        }
    }
    table
}

fn demo_crops() -> CropTable {
    let mut table = CropTable::new();
    for (district, crop, sowing_month, harvest_month) in [
        ("Ernakulam", "Paddy", 6, 10),
        ("Ernakulam", "Pineapple", 11, 3),
        ("Thrissur", "Paddy", 5, 9),
        ("Thrissur", "Coconut", 1, 12),
        ("Thrissur", "Banana", 8, 12),
    ] {
        table.push(district, CropCalendar { crop: crop.to_owned(), sowing_month, harvest_month });
    }
    table
}

fn demo_districts() -> DistrictTable {
    let bases = [
        ("Ernakulam", [62.5, 1_450_000.0, 182_000.0, 910_000.0, 540_000.0]),
        ("Thrissur", [58.1, 1_120_000.0, 164_000.0, 610_000.0, 455_000.0]),
    ];
    DistrictTable::new(
        bases
            .iter()
            .map(|(area_name, values)| DistrictIndicators {
                area_name: (*area_name).to_owned(),
                values: DEFAULT_RATES
                    .iter()
                    .zip(values)
                    .map(|(indicator, value)| (indicator.column.to_owned(), *value))
                    .collect(),
            })
            .collect(),
    )
}

fn demo_scheme_details() -> BTreeMap<String, serde_json::Value> {
    const DETAILS: [(&str, &str, &str); 20] = [
        ("15-Year Public Provident Fund Account (PPF)", "7.1% p.a. compounded yearly", "Any resident Indian; one account per person"),
        ("5-Year Post Office Recurring Deposit (RD)", "6.7% p.a. compounded quarterly", "Individuals, joint accounts and guardians for minors"),
        ("Kisan Vikas Patra (KVP)", "7.5% p.a.; doubles in 115 months", "Adults and guardians on behalf of minors"),
        ("Mahila Samman Savings Certificate", "7.5% p.a. for two years", "Women and guardians of girl children"),
        ("National Savings Certificates (NSC)", "7.7% p.a. compounded yearly", "Individuals; tax deduction under 80C"),
        ("Post Office Monthly Income Scheme (MIS)", "7.4% p.a. paid monthly", "Individuals; single or joint accounts"),
        ("Post Office Savings Account (SB)", "4.0% p.a.", "Any individual; minimum balance Rs 500"),
        ("Post Office Time Deposit Account (TD)", "6.9% to 7.5% p.a. by tenure", "Individuals; 1, 2, 3 or 5 year terms"),
        ("Senior Citizen Savings Scheme (SCSS)", "8.2% p.a. paid quarterly", "Residents aged 60 or above"),
        ("Sukanya Samriddhi Accounts (SSA)", "8.2% p.a. compounded yearly", "Girl child below 10 years"),
        ("10 Years Rural PLI (Gram Priya)", "Money back every 4 years", "Rural residents aged 20 to 45"),
        ("Anticipated Endowment Assurance (Gram Sumangal)", "Periodic survival benefits", "Rural residents aged 19 to 45"),
        ("Anticipated Endowment Assurance (Sumangal)", "Periodic survival benefits", "Eligible employees aged 19 to 45"),
        ("Convertible Whole Life Assurance (Gram Suvidha)", "Whole life, convertible after 5 years", "Rural residents aged 19 to 45"),
        ("Convertible Whole Life Assurance (Suvidha)", "Whole life, convertible after 5 years", "Eligible employees aged 19 to 50"),
        ("Endowment Assurance (Gram Santosh)", "Sum assured with bonus at maturity", "Rural residents aged 19 to 55"),
        ("Endowment Assurance (Santosh)", "Sum assured with bonus at maturity", "Eligible employees aged 19 to 55"),
        ("Joint Life Assurance (Yugal Suraksha)", "Joint cover for spouses", "Couples where one spouse is eligible for PLI"),
        ("Whole Life Assurance (Gram Suraksha)", "Whole life cover with bonus", "Rural residents aged 19 to 55"),
        ("Whole Life Assurance (Suraksha)", "Whole life cover with bonus", "Eligible employees aged 19 to 55"),
    ];
    DETAILS
        .iter()
        .map(|(scheme, returns, eligibility)| {
            ((*scheme).to_owned(), json!({ "returns": returns, "eligibility": eligibility }))
        })
        .collect()
}

/// Networks shaped for the demo columns and a window of [`DEMO_WINDOW_MONTHS`].
pub fn demo_models() -> ModelBundle {
    ModelBundle { savings: demo_family_models(11), insurance: demo_family_models(29) }
}

fn demo_family_models(seed: usize) -> FamilyModels {
    let schemes = SchemeFamily::Savings.schemes().len();
    let per_month = 2;
    let flat = DEMO_WINDOW_MONTHS * per_month;

    let dense = DenseNetwork {
        layers: vec![
            layer(seed, flat * 2, 8, 0.004, 0.5, Activation::Relu),
            layer(seed + 1, 8, schemes, 0.6, 40.0, Activation::Linear),
        ],
    };
    let branch = BranchNetwork {
        main: DenseNetwork { layers: vec![layer(seed + 2, flat, 6, 0.002, 0.0, Activation::Tanh)] },
        neighbor: DenseNetwork {
            layers: vec![layer(seed + 3, flat, 6, 0.002, 0.0, Activation::Tanh)],
        },
        series: RecurrentEncoder {
            input_weights: matrix(seed + 4, per_month, 4, 0.002),
            recurrent_weights: matrix(seed + 5, 4, 4, 0.4),
            bias: vec![0.0; 4],
        },
        head: DenseNetwork {
            layers: vec![layer(seed + 6, 6 + 6 + 4, schemes, 20.0, 45.0, Activation::Linear)],
        },
    };
    FamilyModels { dense, branch }
}

fn layer(
    seed: usize,
    inputs: usize,
    outputs: usize,
    scale: f64,
    bias: f64,
    activation: Activation,
) -> DenseLayer {
    DenseLayer {
        weights: matrix(seed, inputs, outputs, scale),
        bias: (0..outputs).map(|output| bias + (output % 3) as f64).collect(),
        activation,
    }
}

/// Fixed pattern in `[-scale/2, scale/2)`.
fn matrix(seed: usize, rows: usize, cols: usize, scale: f64) -> Vec<Vec<f64>> {
    (0..rows)
        .map(|row| {
            (0..cols)
                .map(|col| {
                    let cell = (seed * 31 + row * 131 + col * 7919) % 1000;
                    (cell as f64 / 1000.0 - 0.5) * scale
                })
                .collect()
        })
        .collect()
}

/// Writes the demo dataset and models into the given directories.
pub fn write_demo_bundle(data_dir: &Path, models_dir: &Path) -> Result<(), DataError> {
    write_dataset(&demo_dataset(), data_dir, DEMO_PAST_COLUMN)?;
    write_models(&demo_models(), models_dir)
}
