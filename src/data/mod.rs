pub mod bar;
pub mod enriched;
pub mod loader;

pub use bar::{validate_series, Bar, DataError};
pub use enriched::{EnrichedBar, EnrichedSeries};
pub use loader::load_csv;
