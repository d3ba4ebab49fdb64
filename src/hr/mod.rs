//! HR tables, employee snapshots and attrition scoring

pub mod records;
pub mod columns;
pub mod tables;
pub mod snapshot;
pub mod attrition;
