//! contains utils used in loading gather files and parsing parameters

pub mod files;
pub mod parameters;

pub use files::*;
pub use parameters::*;
