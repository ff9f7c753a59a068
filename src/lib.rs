pub mod backend;
pub mod cache;
pub mod config;
pub mod context;
pub mod cover;
pub mod dispatcher;
pub mod models;
