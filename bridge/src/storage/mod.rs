//! Storage module

pub mod layout;
pub mod settings;
