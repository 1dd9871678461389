pub mod config;
pub mod gateway;
pub mod http;
pub mod llm;
pub mod pipeline;
pub mod sentiment;
pub mod shared;
pub mod storage;
