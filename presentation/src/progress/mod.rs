//! Progress display for the reasoning loop

pub mod reporter;
