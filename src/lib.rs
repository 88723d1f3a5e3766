mod backend;
mod batch;
mod client;
mod config;
mod create;
mod delete;
mod dynamo;
mod errors;
mod get;
mod memory;
mod scan;
mod table;
mod update;

pub use backend::*;
pub use batch::load_sample_data;
pub use client::*;
pub use config::Config;
pub use dynamo::DynamoBackend;
pub use errors::*;
pub use memory::MemoryBackend;
pub use table::CreateTableOptions;
