//! Report persistence

pub mod report;
