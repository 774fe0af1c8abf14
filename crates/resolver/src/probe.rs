//! Best-effort capability probe behind `interface_implementer`.
//!
//! When a node has no explicit implementer for an interface, its address
//! record may still point at a contract that implements it. The probe asks
//! that contract, and every way the question can go wrong (no address, not a
//! contract, no query entry point, a failing call) reads as "no implementer".

use crate::errors::Result;
use tracing::debug;
use umbra_types::{Address, Host, InterfaceId};

/// Two-stage lookup: `explicit` wins, otherwise probe whatever `fallback_addr`
/// yields. Errors from the fallback path never escape.
pub fn resolve_implementer(
    host: &Host,
    explicit: Address,
    interface_id: InterfaceId,
    fallback_addr: impl FnOnce() -> Result<Address>,
) -> Address {
    if !explicit.is_zero() {
        return explicit;
    }

    let target = match fallback_addr() {
        Ok(target) => target,
        Err(err) => {
            debug!(target: "resolver", "Interface probe skipped, address lookup failed: {}", err);
            return Address::ZERO;
        }
    };

    match probe(host, &target, interface_id) {
        Ok(true) => target,
        Ok(false) => Address::ZERO,
        Err(err) => {
            debug!(
                target: "resolver",
                "Interface probe of {} for {} suppressed: {}",
                target,
                interface_id,
                err
            );
            Address::ZERO
        }
    }
}

/// Ask `target` whether it supports `interface_id`.
///
/// The target must first confirm it answers capability queries at all.
pub fn probe(host: &Host, target: &Address, interface_id: InterfaceId) -> Result<bool> {
    if target.is_zero() {
        return Ok(false);
    }
    if !host.call_supports_interface(target, InterfaceId::SUPPORTS_INTERFACE)? {
        return Ok(false);
    }
    Ok(host.call_supports_interface(target, interface_id)?)
}
