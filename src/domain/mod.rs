//! Domain layer: payment records, the list query, paging and the service port.

pub mod filter;
pub mod pagination;
pub mod payment;
pub mod ports;
pub mod reducer;
