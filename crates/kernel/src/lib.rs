//! Struttura kernel library.
//!
//! In-memory site structures, the bootstrap fetch sequence, and the
//! request dispatcher. The main entry point for running the server is
//! the `struttura` binary.

pub mod config;
pub mod context;
pub mod controller;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod models;
pub mod path;
pub mod routes;
pub mod sequence;
pub mod site;
pub mod state;
pub mod storage;
pub mod theme;
pub mod transport;
