pub mod config;
pub mod logging;

pub mod allocator;
pub mod fetch;
pub mod manifest;
pub mod pipeline;
pub mod run;
pub mod url_model;
