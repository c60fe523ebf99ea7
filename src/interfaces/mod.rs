//! Interfaces to the outside world used by the command-line front end.

pub mod csv;
