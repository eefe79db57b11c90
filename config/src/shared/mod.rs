mod base;
mod connection;
mod controller;
mod retry;

pub use base::*;
pub use connection::*;
pub use controller::*;
pub use retry::*;
