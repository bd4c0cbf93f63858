pub mod aggregator;
pub mod config;
pub mod error;
pub mod grid;
pub mod manifest;
pub mod mode;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod reporter;
pub mod source;
pub mod travel_time;
