//! Unit test harness

mod common;
mod test_gate;
mod test_server;
