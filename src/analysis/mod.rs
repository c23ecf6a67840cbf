//! Post-hoc contagion analysis of clearing outcomes.

pub mod contagion;
