pub mod cfg;
pub mod client;
pub mod codec;
pub mod error;
pub mod notification;
pub mod server;
pub mod worker;
