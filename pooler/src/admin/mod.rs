//! Access to the pooler's administrative console.

mod base;
mod postgres;

pub use base::*;
pub use postgres::*;
