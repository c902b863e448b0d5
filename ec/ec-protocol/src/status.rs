use bitfield_struct::bitfield;

/// The embedded controller status register (`EC_SC`, read side).
///
/// Layout follows the ACPI embedded controller interface. Only
/// [`ibf`](Self::ibf) and [`obf`](Self::obf) take part in the handshake;
/// the other bits are decoded for diagnostics.
#[bitfield(u8, order = Lsb)]
#[derive(Eq, PartialEq)]
pub struct EcStatus {
    /// Bit 0 — OBF: Output Buffer Full.
    ///
    /// The controller has placed a byte in the data port for the host.
    pub obf: bool,

    /// Bit 1 — IBF: Input Buffer Full.
    ///
    /// The host has written a byte the controller has not consumed yet.
    pub ibf: bool,

    /// Bit 2 — Reserved.
    #[bits(access = RO)]
    pub reserved0: bool,

    /// Bit 3 — CMD: the last byte written was a command, not data.
    pub cmd: bool,

    /// Bit 4 — BURST: the controller is in burst mode.
    pub burst: bool,

    /// Bit 5 — `SCI_EVT`: an SCI event is pending.
    pub sci_evt: bool,

    /// Bit 6 — `SMI_EVT`: an SMI event is pending.
    pub smi_evt: bool,

    /// Bit 7 — Reserved.
    #[bits(access = RO)]
    pub reserved1: bool,
}

/// A status flag the handshake waits on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum StatusFlag {
    /// IBF, bit 1. Clear when the controller can take another byte.
    InputBufferFull,
    /// OBF, bit 0. Set when a result byte is waiting in the data port.
    OutputBufferFull,
}

impl StatusFlag {
    /// Bit position of the flag inside the status register.
    #[must_use]
    pub const fn bit(self) -> u8 {
        match self {
            Self::InputBufferFull => 1,
            Self::OutputBufferFull => 0,
        }
    }

    /// Whether the flag reads as `expected` in the raw status byte.
    #[must_use]
    pub const fn matches(self, status: u8, expected: bool) -> bool {
        ((status >> self.bit()) & 1 == 1) == expected
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputBufferFull => "IBF",
            Self::OutputBufferFull => "OBF",
        }
    }
}

impl core::fmt::Display for StatusFlag {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
