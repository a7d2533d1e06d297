pub mod api;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod export;
pub mod ingest;
pub mod model;
pub mod routes;
pub mod store;
pub mod utils;
