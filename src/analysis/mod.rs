pub mod classify;
pub mod freshness;
pub mod log_parser;
pub mod selection;
