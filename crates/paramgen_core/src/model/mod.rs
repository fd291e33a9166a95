mod definition;
mod ids;
mod settings;

pub use definition::{GroupValue, ParameterDefinition, RefValue, SchemaVersion};
pub use ids::ParameterId;
pub use settings::SamplingSettings;
