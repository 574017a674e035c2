pub mod client;
pub mod config;
pub mod coordinator;
pub mod errors;
pub mod generator;
pub mod intake;
pub mod llm;
pub mod models;
pub mod render;
pub mod server;
pub mod ui;
pub mod util;
