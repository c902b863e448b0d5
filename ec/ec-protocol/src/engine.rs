use crate::error::EcError;
use crate::layout::ControllerLayout;
use crate::status::{EcStatus, StatusFlag};
use crate::wait::{Delay, ThreadSleep, WaitTimeout, poll_flag};
use core::fmt;
use ec_ports::{IoPorts, PortIo};
use log::{debug, trace, warn};

/// Register transaction kind.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Operation {
    Read,
    Write,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
        })
    }
}

/// The handshake waits of a register transaction, in protocol order.
///
/// ```text
/// read:  CommandReady → cmd → AddressReady → addr → ResultReady  → data in
/// write: CommandReady → cmd → AddressReady → addr → ValueReady   → data out → ValueAccepted
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum WaitStep {
    /// IBF=0 before the command byte.
    CommandReady,
    /// IBF=0 before the register address.
    AddressReady,
    /// IBF=0 before the value byte of a write.
    ValueReady,
    /// OBF=1 before the result byte of a read is collected.
    ResultReady,
    /// IBF=0 after the value byte of a write.
    ValueAccepted,
}

impl WaitStep {
    /// The flag and level this step waits for.
    #[must_use]
    pub const fn condition(self) -> (StatusFlag, bool) {
        match self {
            Self::CommandReady | Self::AddressReady | Self::ValueReady | Self::ValueAccepted => {
                (StatusFlag::InputBufferFull, false)
            }
            Self::ResultReady => (StatusFlag::OutputBufferFull, true),
        }
    }

    /// Whether this is the last wait of its transaction.
    #[must_use]
    pub const fn is_final(self) -> bool {
        matches!(self, Self::ResultReady | Self::ValueAccepted)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CommandReady => "command ready",
            Self::AddressReady => "address ready",
            Self::ValueReady => "value ready",
            Self::ResultReady => "result ready",
            Self::ValueAccepted => "value accepted",
        }
    }
}

impl fmt::Display for WaitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a transaction does when a handshake wait times out.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum TimeoutPolicy {
    /// Only the final wait of a transaction ([`WaitStep::is_final`]) fails it.
    /// Timeouts while waiting to send the command, address or value byte are
    /// logged and the byte is sent anyway, as the vendor tooling does.
    #[default]
    Lenient,
    /// Any timeout fails the transaction.
    Strict,
}

impl TimeoutPolicy {
    /// Whether a timeout in `step` lets the transaction carry on.
    #[must_use]
    pub const fn tolerates(self, step: WaitStep) -> bool {
        matches!(self, Self::Lenient) && !step.is_final()
    }
}

/// An embedded controller reached through its command and data ports.
///
/// Transactions take `&mut self`, so one controller handle can never have
/// two of them in flight.
#[derive(Debug)]
pub struct EmbeddedController<P, D = ThreadSleep> {
    io: P,
    delay: D,
    layout: ControllerLayout,
    policy: TimeoutPolicy,
}

impl EmbeddedController<IoPorts, ThreadSleep> {
    /// Acquire the hardware ports described by `layout`.
    ///
    /// # Errors
    /// [`EcError::Access`] if either port is refused; nothing is sent to the
    /// controller in that case.
    pub fn open(layout: ControllerLayout, policy: TimeoutPolicy) -> Result<Self, EcError> {
        let io = IoPorts::acquire(&layout.ports())?;
        debug!(
            "embedded controller at {:#06x}/{:#06x}, {policy:?} timeouts",
            layout.command_port, layout.data_port
        );
        Ok(Self::new(io, ThreadSleep, layout, policy))
    }
}

impl<P, D> EmbeddedController<P, D>
where
    P: PortIo,
    D: Delay,
{
    #[must_use]
    pub const fn new(io: P, delay: D, layout: ControllerLayout, policy: TimeoutPolicy) -> Self {
        Self {
            io,
            delay,
            layout,
            policy,
        }
    }

    #[must_use]
    pub const fn layout(&self) -> &ControllerLayout {
        &self.layout
    }

    #[must_use]
    pub const fn policy(&self) -> TimeoutPolicy {
        self.policy
    }

    /// Give back the port handle.
    #[must_use]
    pub fn into_inner(self) -> P {
        self.io
    }

    /// Read the status register once.
    pub fn status(&mut self) -> EcStatus {
        EcStatus::from_bits(self.io.read_byte(self.layout.command_port))
    }

    /// Poll the status register until `flag` reads as `expected`.
    ///
    /// # Errors
    /// [`WaitTimeout`] after the layout's attempt budget is used up.
    pub fn wait_for_flag(&mut self, flag: StatusFlag, expected: bool) -> Result<(), WaitTimeout> {
        let port = self.layout.command_port;
        let io = &mut self.io;
        poll_flag(
            || io.read_byte(port),
            &mut self.delay,
            flag,
            expected,
            &self.layout.timing,
        )
    }

    /// Read one byte from the controller's register space.
    ///
    /// # Errors
    /// [`EcError::Timeout`] if the result never became ready, or if an earlier
    /// wait timed out under [`TimeoutPolicy::Strict`].
    pub fn read_register(&mut self, address: u8) -> Result<u8, EcError> {
        let op = Operation::Read;

        self.await_step(op, address, WaitStep::CommandReady)?;
        self.send_command(self.layout.read_command);

        self.await_step(op, address, WaitStep::AddressReady)?;
        self.send_data(address);

        self.await_step(op, address, WaitStep::ResultReady)?;
        let value = self.io.read_byte(self.layout.data_port);

        debug!("read register {address:#04x} = {value:#04x}");
        Ok(value)
    }

    /// Write one byte into the controller's register space.
    ///
    /// # Errors
    /// [`EcError::Timeout`] if the controller did not take the value byte, or
    /// if an earlier wait timed out under [`TimeoutPolicy::Strict`].
    pub fn write_register(&mut self, address: u8, value: u8) -> Result<(), EcError> {
        let op = Operation::Write;

        self.await_step(op, address, WaitStep::CommandReady)?;
        self.send_command(self.layout.write_command);

        self.await_step(op, address, WaitStep::AddressReady)?;
        self.send_data(address);

        self.await_step(op, address, WaitStep::ValueReady)?;
        self.send_data(value);

        self.await_step(op, address, WaitStep::ValueAccepted)?;

        debug!("wrote register {address:#04x} = {value:#04x}");
        Ok(())
    }

    fn await_step(&mut self, operation: Operation, register: u8, step: WaitStep) -> Result<(), EcError> {
        let (flag, expected) = step.condition();
        match self.wait_for_flag(flag, expected) {
            Ok(()) => Ok(()),
            Err(source) if self.policy.tolerates(step) => {
                warn!("{operation} of register {register:#04x}: {step}: {source}; sending anyway");
                Ok(())
            }
            Err(source) => Err(EcError::Timeout {
                operation,
                register,
                step,
                source,
            }),
        }
    }

    fn send_command(&mut self, command: u8) {
        trace!("EC_SC <- {command:#04x}");
        self.io.write_byte(self.layout.command_port, command);
    }

    fn send_data(&mut self, byte: u8) {
        trace!("EC_DATA <- {byte:#04x}");
        self.io.write_byte(self.layout.data_port, byte);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::CLEVO;
    use crate::sim::{NoDelay, PortOp, SimulatedController};

    const SC: u16 = CLEVO.command_port;
    const DATA: u16 = CLEVO.data_port;

    fn controller(
        sim: &mut SimulatedController,
        policy: TimeoutPolicy,
    ) -> EmbeddedController<&mut SimulatedController, NoDelay> {
        EmbeddedController::new(sim, NoDelay, CLEVO, policy)
    }

    #[test]
    fn read_follows_the_handshake() {
        let mut sim = SimulatedController::new(CLEVO).with_register(0x07, 45);
        let value = controller(&mut sim, TimeoutPolicy::Lenient)
            .read_register(0x07)
            .expect("read");
        assert_eq!(value, 45);

        assert_eq!(
            sim.ops(),
            &[
                PortOp::Read { port: SC, value: 0x00 },
                PortOp::Write { port: SC, value: 0x80 },
                PortOp::Read { port: SC, value: 0x00 },
                PortOp::Write { port: DATA, value: 0x07 },
                PortOp::Read { port: SC, value: 0x01 },
                PortOp::Read { port: DATA, value: 45 },
            ]
        );
    }

    #[test]
    fn write_follows_the_handshake() {
        let mut sim = SimulatedController::new(CLEVO);
        controller(&mut sim, TimeoutPolicy::Lenient)
            .write_register(0x01, 0x80)
            .expect("write");
        assert_eq!(sim.register(0x01), 0x80);

        assert_eq!(
            sim.ops(),
            &[
                PortOp::Read { port: SC, value: 0x00 },
                PortOp::Write { port: SC, value: 0x99 },
                PortOp::Read { port: SC, value: 0x00 },
                PortOp::Write { port: DATA, value: 0x01 },
                PortOp::Read { port: SC, value: 0x00 },
                PortOp::Write { port: DATA, value: 0x80 },
                PortOp::Read { port: SC, value: 0x00 },
            ]
        );
    }

    #[test]
    fn missing_result_fails_the_read() {
        let mut sim = SimulatedController::new(CLEVO).with_register(0xCE, 0x10);
        sim.withhold_output(true);

        let err = controller(&mut sim, TimeoutPolicy::Lenient)
            .read_register(0xCE)
            .expect_err("OBF never rises");

        match err {
            EcError::Timeout {
                operation,
                register,
                step,
                source,
            } => {
                assert_eq!(operation, Operation::Read);
                assert_eq!(register, 0xCE);
                assert_eq!(step, WaitStep::ResultReady);
                assert_eq!(source.flag, StatusFlag::OutputBufferFull);
                assert_eq!(source.attempts, 100);
            }
            other => panic!("unexpected error: {other}"),
        }

        // The data port is never read without OBF.
        assert!(!sim.ops().iter().any(|op| matches!(op, PortOp::Read { port: DATA, .. })));
    }

    #[test]
    fn lenient_read_sends_past_a_busy_input_buffer() {
        let mut sim = SimulatedController::new(CLEVO).with_register(0x07, 61);
        sim.hold_input_buffer_full(true);

        let value = controller(&mut sim, TimeoutPolicy::Lenient)
            .read_register(0x07)
            .expect("OBF still rises");
        assert_eq!(value, 61);

        // Two exhausted IBF waits, then OBF on the first try.
        assert_eq!(sim.status_reads(), 201);
    }

    #[test]
    fn strict_read_stops_at_a_busy_input_buffer() {
        let mut sim = SimulatedController::new(CLEVO).with_register(0x07, 61);
        sim.hold_input_buffer_full(true);

        let err = controller(&mut sim, TimeoutPolicy::Strict)
            .read_register(0x07)
            .expect_err("IBF never clears");
        assert!(matches!(
            err,
            EcError::Timeout {
                step: WaitStep::CommandReady,
                ..
            }
        ));

        // Nothing but status polling reached the controller.
        assert_eq!(sim.status_reads(), 100);
        assert!(sim.ops().iter().all(|op| matches!(op, PortOp::Read { port: SC, .. })));
    }

    #[test]
    fn lenient_write_reports_the_final_acceptance_timeout() {
        let mut sim = SimulatedController::new(CLEVO);
        sim.hold_input_buffer_full(true);

        let err = controller(&mut sim, TimeoutPolicy::Lenient)
            .write_register(0x01, 0xFF)
            .expect_err("value never accepted");
        assert!(matches!(
            err,
            EcError::Timeout {
                operation: Operation::Write,
                step: WaitStep::ValueAccepted,
                ..
            }
        ));

        // All bytes went out regardless.
        assert_eq!(sim.register(0x01), 0xFF);
        assert_eq!(sim.status_reads(), 400);
    }

    #[test]
    fn strict_write_sends_nothing_to_a_busy_controller() {
        let mut sim = SimulatedController::new(CLEVO);
        sim.hold_input_buffer_full(true);

        let err = controller(&mut sim, TimeoutPolicy::Strict)
            .write_register(0x01, 0xFF)
            .expect_err("IBF never clears");
        assert!(err.is_timeout());
        assert_eq!(sim.register(0x01), 0x00);
        assert!(sim.writes().next().is_none());
    }

    #[test]
    fn only_final_waits_are_fatal_when_lenient() {
        let lenient = TimeoutPolicy::Lenient;
        assert!(lenient.tolerates(WaitStep::CommandReady));
        assert!(lenient.tolerates(WaitStep::AddressReady));
        assert!(lenient.tolerates(WaitStep::ValueReady));
        assert!(!lenient.tolerates(WaitStep::ResultReady));
        assert!(!lenient.tolerates(WaitStep::ValueAccepted));

        for step in [
            WaitStep::CommandReady,
            WaitStep::AddressReady,
            WaitStep::ValueReady,
            WaitStep::ResultReady,
            WaitStep::ValueAccepted,
        ] {
            assert!(!TimeoutPolicy::Strict.tolerates(step));
        }
    }

    #[test]
    fn timeout_error_names_operation_and_step() {
        let mut sim = SimulatedController::new(CLEVO);
        sim.withhold_output(true);
        let err = controller(&mut sim, TimeoutPolicy::Lenient)
            .read_register(0xD0)
            .expect_err("no result");
        assert_eq!(
            err.to_string(),
            "read of register 0xd0: result ready: timed out waiting for OBF=1 after 100 status reads (last status 0x00)"
        );
    }
}
