//! Application layer orchestrating the payment list.
//!
//! `PaymentListController` ties the filter classifier, the reducer and the
//! paginator to the remote payment service, and reports every outcome through
//! the process-wide `NotificationBus`. Work is scheduled on `tokio`; the only
//! suspension points are calls to the service and the debounce timer.

pub mod controller;
pub mod notifications;
