//! Terminal client for the SPLASP analysis platform.
//!
//! The crate is organised around one writable piece of state, the session
//! store in [`identity`], and three consumers of it: the HTTP layer in
//! [`client`] which stamps a bearer credential onto every outgoing request,
//! and the screen guards and navigation composer in [`identity`] and
//! [`console`] which decide what the signed-in user may open and see.

pub mod error;
pub mod identity;
pub mod client;
pub mod console;
