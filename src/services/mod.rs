//! Core services: enumeration, extraction, accumulation, checkpointing and scan orchestration

pub mod accumulate;
pub mod checkpoint;
pub mod enumerate;
pub mod extract;
pub mod format;
pub mod location;
pub mod scan;
pub mod store;
