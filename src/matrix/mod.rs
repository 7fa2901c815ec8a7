//! Matrix module: CSR sparse storage used throughout the pipeline.

pub mod sparse;
pub use sparse::CsrMatrix;
