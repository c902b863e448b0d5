//! A register-file stand-in for the embedded controller.
//!
//! [`SimulatedController`] speaks the same handshake as the hardware: a
//! command byte on the command port selects read or write, the next data
//! byte is the register address, and a write takes one more data byte. It
//! consumes input instantly and can be told to misbehave so that timeout
//! handling can be exercised.

use crate::layout::ControllerLayout;
use crate::status::EcStatus;
use crate::wait::Delay;
use core::time::Duration;
use ec_ports::PortIo;

/// One port access as seen by the simulated controller.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PortOp {
    Read { port: u16, value: u8 },
    Write { port: u16, value: u8 },
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum Phase {
    Idle,
    ReadAddress,
    WriteAddress,
    WriteValue(u8),
}

#[derive(Debug, Clone)]
pub struct SimulatedController {
    layout: ControllerLayout,
    registers: [u8; 256],
    phase: Phase,
    output: Option<u8>,
    input_stuck: bool,
    output_withheld: bool,
    ops: Vec<PortOp>,
}

impl SimulatedController {
    #[must_use]
    pub const fn new(layout: ControllerLayout) -> Self {
        Self {
            layout,
            registers: [0; 256],
            phase: Phase::Idle,
            output: None,
            input_stuck: false,
            output_withheld: false,
            ops: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_register(mut self, address: u8, value: u8) -> Self {
        self.set_register(address, value);
        self
    }

    pub fn set_register(&mut self, address: u8, value: u8) {
        self.registers[usize::from(address)] = value;
    }

    #[must_use]
    pub fn register(&self, address: u8) -> u8 {
        self.registers[usize::from(address)]
    }

    /// Keep IBF set no matter what. Bytes are still taken.
    pub fn hold_input_buffer_full(&mut self, stuck: bool) {
        self.input_stuck = stuck;
    }

    /// Never raise OBF, even when a result is pending.
    pub fn withhold_output(&mut self, withheld: bool) {
        self.output_withheld = withheld;
    }

    #[must_use]
    pub fn status(&self) -> EcStatus {
        EcStatus::new()
            .with_ibf(self.input_stuck)
            .with_obf(self.output.is_some() && !self.output_withheld)
    }

    /// Every port access so far, oldest first.
    #[must_use]
    pub fn ops(&self) -> &[PortOp] {
        &self.ops
    }

    /// Every port write so far as `(port, value)`.
    pub fn writes(&self) -> impl Iterator<Item = (u16, u8)> + '_ {
        self.ops.iter().filter_map(|op| match *op {
            PortOp::Write { port, value } => Some((port, value)),
            PortOp::Read { .. } => None,
        })
    }

    /// Number of status register reads so far.
    #[must_use]
    pub fn status_reads(&self) -> usize {
        let port = self.layout.command_port;
        self.ops
            .iter()
            .filter(|op| matches!(op, PortOp::Read { port: p, .. } if *p == port))
            .count()
    }

    fn command(&mut self, command: u8) {
        self.output = None;
        self.phase = if command == self.layout.read_command {
            Phase::ReadAddress
        } else if command == self.layout.write_command {
            Phase::WriteAddress
        } else {
            Phase::Idle
        };
    }

    fn data(&mut self, byte: u8) {
        self.phase = match self.phase {
            Phase::ReadAddress => {
                self.output = Some(self.register(byte));
                Phase::Idle
            }
            Phase::WriteAddress => Phase::WriteValue(byte),
            Phase::WriteValue(address) => {
                self.set_register(address, byte);
                Phase::Idle
            }
            Phase::Idle => Phase::Idle,
        };
    }
}

impl PortIo for SimulatedController {
    fn read_byte(&mut self, port: u16) -> u8 {
        let value = if port == self.layout.command_port {
            self.status().into_bits()
        } else if port == self.layout.data_port {
            self.output.take().unwrap_or(0xFF)
        } else {
            0xFF
        };
        self.ops.push(PortOp::Read { port, value });
        value
    }

    fn write_byte(&mut self, port: u16, value: u8) {
        self.ops.push(PortOp::Write { port, value });
        if port == self.layout.command_port {
            self.command(value);
        } else if port == self.layout.data_port {
            self.data(value);
        }
    }
}

/// A [`Delay`] that returns immediately.
#[derive(Debug, Default, Copy, Clone)]
pub struct NoDelay;

impl Delay for NoDelay {
    #[inline]
    fn delay(&mut self, _duration: Duration) {}
}
