pub mod pricing;
pub mod summary;

pub use pricing::{PricingConfig, PricingEngine, PricingError};
pub use summary::{LineKind, PriceSummary, SummaryLine};
