pub mod cache;
pub mod config;
pub mod date;
pub mod engine;
pub mod fetch;
pub mod fields;
pub mod harness;
pub mod lines;
pub mod model;
pub mod name;
pub mod pipeline;
