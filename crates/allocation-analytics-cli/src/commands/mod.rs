pub mod allocation;
pub mod benchmarks;
pub mod report;
