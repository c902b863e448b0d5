//! Hardware constants of a controller family.
//!
//! Every port, command code, register address and timing value the protocol
//! uses lives in a [`ControllerLayout`]. Supporting another controller means
//! supplying another table.

use core::time::Duration;

/// Register addresses inside the controller's 256-byte register space.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RegisterMap {
    pub cpu_temp: u8,
    pub gpu_temp: u8,
    /// Current fan duty, `0..=255`.
    pub fan_duty: u8,
    /// Fan duty setpoint. Writes go here, not to [`fan_duty`](Self::fan_duty).
    pub fan_duty_write: u8,
    pub fan_rpms_hi: u8,
    pub fan_rpms_lo: u8,
}

/// How long a single handshake wait may take.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PollTiming {
    /// Pause between two status reads.
    pub interval: Duration,
    /// Number of status reads before giving up.
    pub attempts: u32,
}

impl PollTiming {
    /// Upper bound of time spent sleeping in one wait.
    #[must_use]
    pub const fn budget(&self) -> Duration {
        self.interval.saturating_mul(self.attempts.saturating_sub(1))
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ControllerLayout {
    /// Status register on read, command register on write (`EC_SC`).
    pub command_port: u16,
    /// Data register (`EC_DATA`).
    pub data_port: u16,
    pub read_command: u8,
    pub write_command: u8,
    pub registers: RegisterMap,
    /// Tachometer period count to RPM: `rpm = tachometer_constant / count`.
    pub tachometer_constant: u32,
    pub timing: PollTiming,
}

impl ControllerLayout {
    /// The two ports the process needs access to, command port first.
    #[must_use]
    pub const fn ports(&self) -> [u16; 2] {
        [self.command_port, self.data_port]
    }
}

/// Clevo laptop embedded controllers.
pub const CLEVO: ControllerLayout = ControllerLayout {
    command_port: 0x66,
    data_port: 0x62,
    read_command: 0x80,
    write_command: 0x99,
    registers: RegisterMap {
        cpu_temp: 0x07,
        gpu_temp: 0xCD,
        fan_duty: 0xCE,
        fan_duty_write: 0x01,
        fan_rpms_hi: 0xD0,
        fan_rpms_lo: 0xD1,
    },
    tachometer_constant: 2_156_220,
    timing: PollTiming {
        interval: Duration::from_millis(1),
        attempts: 100,
    },
};

impl Default for ControllerLayout {
    fn default() -> Self {
        CLEVO
    }
}
