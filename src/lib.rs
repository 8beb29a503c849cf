pub mod config;
pub mod fetch;
pub mod normalize;
pub mod output;
pub mod parser;
pub mod report;
pub mod scoring;
pub mod source;
pub mod submission;
