pub mod config;
pub mod error;
pub mod node;
pub mod path;
pub mod protocol;
pub mod search;
pub mod server;
pub mod store;
pub mod transport;
