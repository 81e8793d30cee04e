// Data models shared between the engine and its clients.
pub mod models;
pub mod utils;
