//! Numerical building blocks used by the signal scorers.

pub mod geo;
pub mod similarity;
pub mod stats;
