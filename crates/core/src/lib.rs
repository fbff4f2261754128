pub mod config;
pub mod domain;
pub mod ensemble;
pub mod errors;
pub mod nbf;
pub mod neighbors;
pub mod projections;
pub mod ranking;
pub mod recommend;

pub use config::{AppConfig, LlmProvider, LoadOptions, LogFormat};
pub use domain::dataset::{Dataset, FamilyData, ModelColumns};
pub use domain::scheme::{SchemeFamily, INSURANCE_SCHEMES, SAVINGS_SCHEMES};
pub use ensemble::{EnsemblePredictor, FamilyModels, ModelBundle};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use neighbors::{find_similar_post_offices, Neighbor};
pub use projections::{project_district, Projection, DEFAULT_RATES};
pub use ranking::SchemeScore;
pub use recommend::{
    current_month, CombinedRecommendation, RecommendOptions, Recommendation, SchemeRecommender,
};
