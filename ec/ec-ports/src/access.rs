use crate::PortIo;
use log::{debug, trace};
use std::io;

/// The kernel refused access to an I/O port.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct AccessError {
    port: u16,
    #[source]
    source: io::Error,
}

impl AccessError {
    #[must_use]
    pub const fn new(port: u16, source: io::Error) -> Self {
        Self { port, source }
    }

    /// The port whose grant failed.
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// The operating system's reason.
    #[must_use]
    pub const fn os_error(&self) -> &io::Error {
        &self.source
    }
}

/// Process-wide access to a fixed set of I/O ports.
///
/// Holding an `IoPorts` is proof that every listed port was granted. The grant
/// is never revoked explicitly; the kernel drops it when the process exits.
#[derive(Debug)]
pub struct IoPorts {
    granted: Vec<u16>,
}

impl IoPorts {
    /// Request access to each port in `ports`, in order.
    ///
    /// # Errors
    /// Returns the first port the kernel refused (usually `EPERM` because the
    /// process lacks `CAP_SYS_RAWIO`). Ports granted before the failure are
    /// not used.
    pub fn acquire(ports: &[u16]) -> Result<Self, AccessError> {
        for &port in ports {
            grant(port)?;
            trace!("granted I/O port {port:#06x}");
        }
        debug!("acquired {} I/O port(s)", ports.len());
        Ok(Self {
            granted: ports.to_vec(),
        })
    }

    /// Whether `port` is covered by this grant.
    #[must_use]
    pub fn grants(&self, port: u16) -> bool {
        self.granted.contains(&port)
    }

    fn check(&self, port: u16) {
        assert!(self.grants(port), "I/O port {port:#06x} was not acquired");
    }
}

impl PortIo for IoPorts {
    /// # Panics
    /// Panics if `port` was not part of the grant.
    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    fn read_byte(&mut self, port: u16) -> u8 {
        self.check(port);
        // SAFETY: `check` ensures the process holds an ioperm grant for `port`.
        unsafe { crate::raw::inb(port) }
    }

    /// # Panics
    /// Panics if `port` was not part of the grant.
    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    fn write_byte(&mut self, port: u16, value: u8) {
        self.check(port);
        // SAFETY: `check` ensures the process holds an ioperm grant for `port`.
        unsafe { crate::raw::outb(port, value) }
    }

    #[cfg(not(all(target_os = "linux", target_arch = "x86_64")))]
    fn read_byte(&mut self, port: u16) -> u8 {
        self.check(port);
        unreachable!("I/O ports cannot be acquired on this target")
    }

    #[cfg(not(all(target_os = "linux", target_arch = "x86_64")))]
    fn write_byte(&mut self, port: u16, _value: u8) {
        self.check(port);
        unreachable!("I/O ports cannot be acquired on this target")
    }
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
fn grant(port: u16) -> Result<(), AccessError> {
    // SAFETY: ioperm only edits this process's I/O permission bitmap.
    let rc = unsafe { libc::ioperm(libc::c_ulong::from(port), 1, 1) };
    if rc == 0 {
        Ok(())
    } else {
        Err(AccessError::new(port, io::Error::last_os_error()))
    }
}

#[cfg(not(all(target_os = "linux", target_arch = "x86_64")))]
fn grant(port: u16) -> Result<(), AccessError> {
    Err(AccessError::new(
        port,
        io::Error::new(
            io::ErrorKind::Unsupported,
            "port I/O is only available on x86_64 Linux",
        ),
    ))
}
