//! FIFS Subdomain Registrar
//!
//! Hands out children of one fixed parent node to whoever claims them
//! first. The parent's owner enables the registrar by approving it as an
//! operator in the directory; from then on any caller may claim an unowned
//! label, optionally seeding its resolver and stealth keys in the same call.

pub mod errors;
pub mod registrar;

pub use errors::*;
pub use registrar::FifsRegistrar;
