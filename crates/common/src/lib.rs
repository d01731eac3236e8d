// ghostwrite-common: shared types and utilities for the Ghostwrite workspace

pub mod identity;
pub mod palette;
pub mod text;
pub mod types;
