pub mod error;
pub mod fixtures;
pub mod loader;
pub mod table;
pub mod writer;

pub use error::DataError;
pub use fixtures::{demo_dataset, demo_models, write_demo_bundle, DEMO_PAST_COLUMN};
pub use loader::{load_dataset, load_models};
pub use writer::{write_dataset, write_models};
