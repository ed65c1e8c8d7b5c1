pub mod graph;
pub mod rebuild;
pub mod search;
pub mod stats;
