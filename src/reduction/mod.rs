//! Reduced-basis extraction from solution snapshots.

pub mod pod;

pub use pod::pod_basis;
