//! Scoring pipeline: signal scorers → ensemble → post-processing gate.

pub mod anomaly;
