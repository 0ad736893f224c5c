//! roomcast gateway library entry.
//!
//! This crate wires the transport, chat hub, realtime core (presence,
//! reclamation, egress), and persistence backends into one chat server. It is
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod hub;
pub mod ops;
pub mod realtime;
pub mod router;
pub mod store;
pub mod transport;
