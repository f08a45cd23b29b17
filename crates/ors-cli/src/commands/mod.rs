pub mod notify;
pub mod server;
pub mod session;
