pub mod collections;
pub mod summaries;
