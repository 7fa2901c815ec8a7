//! Core traits and vector wrappers shared by solvers and preconditioners.

pub mod traits;
pub mod wrappers;

pub use traits::{Diagonal, Indexing, InnerProduct, MatVec};
