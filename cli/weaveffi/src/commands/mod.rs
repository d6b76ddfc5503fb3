//! CLI command implementations.

pub mod doctor;
pub mod generate;
pub mod new;
pub mod validate;
