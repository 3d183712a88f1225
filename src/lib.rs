pub mod analyzers;
pub mod config;
pub mod output;
pub mod parser;
pub mod records;
pub mod table;
