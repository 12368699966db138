// Library exports for the FaceCrook store
// This allows integration tests and the server binary to share modules

pub mod chat_memory;
pub mod config;
pub mod db;
pub mod error;
pub mod kv;
pub mod routes;
pub mod state;
pub mod store;
