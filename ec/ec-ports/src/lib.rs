//! # Legacy I/O Port Access for User Space
//!
//! Embedded controllers on x86 laptops are reached through two ports of the
//! legacy I/O address space: a status/command port and a data port. A user
//! space process may only touch them after the kernel has granted it access
//! (Linux `ioperm(2)`, which requires `CAP_SYS_RAWIO`).
//!
//! This crate keeps that boundary narrow:
//!
//! * [`IoPorts::acquire`] requests the grant for a fixed set of ports and fails
//!   with an [`AccessError`] if any of them is refused.
//! * [`PortIo`] is the only interface the protocol layer sees: one byte in,
//!   one byte out, no retries and no caching.
//! * [`raw`] holds the `in`/`out` instructions; it is the only place with
//!   `unsafe` hardware access.
//!
//! ```no_run
//! use ec_ports::{IoPorts, PortIo};
//!
//! let mut ports = IoPorts::acquire(&[0x66, 0x62])?;
//! let status = ports.read_byte(0x66);
//! # Ok::<(), ec_ports::AccessError>(())
//! ```

#![allow(unsafe_code)]

mod access;
pub mod raw;

pub use access::{AccessError, IoPorts};

/// Byte-wide access to I/O ports.
///
/// Every call goes straight to the device (or its stand-in): implementations
/// must not cache, retry or reorder.
pub trait PortIo {
    /// Read one byte from `port`.
    fn read_byte(&mut self, port: u16) -> u8;

    /// Write `value` to `port`.
    fn write_byte(&mut self, port: u16, value: u8);
}

impl<T> PortIo for &mut T
where
    T: PortIo + ?Sized,
{
    #[inline]
    fn read_byte(&mut self, port: u16) -> u8 {
        (**self).read_byte(port)
    }

    #[inline]
    fn write_byte(&mut self, port: u16, value: u8) {
        (**self).write_byte(port, value);
    }
}
