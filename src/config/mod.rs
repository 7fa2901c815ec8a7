//! Pipeline configuration.

pub mod options;
pub use options::ResponseOptions;
