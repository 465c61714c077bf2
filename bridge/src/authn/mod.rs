//! Authentication module

pub mod exchange;
pub mod pkce;
pub mod token;
pub mod token_mngr;
