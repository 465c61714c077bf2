//! Gatelink Library
//!
//! Core modules for the Gatelink CAME Connect bridge.

pub mod app;
pub mod authn;
pub mod came;
pub mod errors;
pub mod filesys;
pub mod gate;
pub mod logs;
pub mod server;
pub mod storage;
pub mod utils;
