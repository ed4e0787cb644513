//! Address handling shared by the lease pipeline and the pool calculator.

pub mod interface;
pub mod ip;
pub mod mac;
pub mod range;
