//! Color matrix representation and the filter + slider composition chain.

pub mod combine;
pub mod matrix;
