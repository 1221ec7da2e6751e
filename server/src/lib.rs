pub mod broadcast;
pub mod canvas;
pub mod connection;
pub mod handlers;
pub mod registry;
pub mod server;
