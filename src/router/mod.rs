// Router module
// Public interface for model and sampling decisions

mod model_selector;
mod temperature;

pub use model_selector::{classify_tier, select_model, ModelTable, ModelTier, TieredModels};
pub use temperature::TemperaturePolicy;
