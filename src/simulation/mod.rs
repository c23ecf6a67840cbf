//! Stress-testing utilities: random network generation.

pub mod random_network;
