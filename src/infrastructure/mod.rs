//! Adapters implementing the payment service port.

pub mod in_memory;
pub mod timeout;
