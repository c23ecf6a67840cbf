//! The clearing-vector fixed-point solver.

pub mod clearing;
