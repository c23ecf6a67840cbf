//! Foundational types: the interbank financial network.

pub mod network;
