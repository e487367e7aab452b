//! Command-line front end for `jsonmerge`.

pub mod cli;
pub mod logging;
