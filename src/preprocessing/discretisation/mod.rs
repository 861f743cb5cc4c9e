//! Discretisation of numeric columns into ordered bins.

mod equal_frequency;

pub use equal_frequency::{
    EqualFrequencyDiscretiser, EqualFrequencyDiscretiserParams, FittedEqualFrequencyDiscretiser,
};
