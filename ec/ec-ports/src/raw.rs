//! # Raw x86 Port Instructions
//!
//! Thin wrappers around `in al, dx` and `out dx, al`. They are only compiled
//! for `x86_64` Linux, the one target where [`IoPorts`](crate::IoPorts) can
//! obtain a grant.
//!
//! ## Privilege
//!
//! In user space the CPU checks the task's I/O permission bitmap on every
//! `in`/`out`. Executing either instruction on a port that was not granted
//! through `ioperm(2)` raises `#GP`, which the kernel delivers as `SIGSEGV`.
//!
//! ## Ordering
//!
//! `in`/`out` are ordered with respect to each other but are not a general
//! memory fence. The embedded controller handshake only ever orders port
//! accesses against other port accesses, so no extra fences are needed.

/// Write one byte to an I/O port.
///
/// # Safety
/// - **Permission:** the calling process must hold an `ioperm(2)` grant that
///   covers `port`; otherwise the process is killed with `SIGSEGV`.
/// - **Correct port:** `port` must belong to the intended device, and the
///   device must be in a state that expects this write. A stray write into an
///   embedded controller's command port can leave it waiting for bytes that
///   never come.
/// - **Exclusivity:** no other code may be in the middle of a multi-byte
///   handshake on the same device.
#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
#[inline]
pub unsafe fn outb(port: u16, val: u8) {
    unsafe {
        core::arch::asm!("out dx, al", in("dx") port, in("al") val, options(nomem, nostack, preserves_flags));
    }
}

/// Read one byte from an I/O port.
///
/// # Safety
/// - **Permission:** the calling process must hold an `ioperm(2)` grant that
///   covers `port`; otherwise the process is killed with `SIGSEGV`.
/// - **Correct port:** reading a data port can consume a byte the device
///   meant for a different transaction.
/// - **Exclusivity:** see [`outb`].
#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
#[inline]
pub unsafe fn inb(port: u16) -> u8 {
    let mut v: u8;
    unsafe {
        core::arch::asm!("in al, dx", in("dx") port, out("al") v, options(nomem, nostack, preserves_flags));
    }
    v
}
