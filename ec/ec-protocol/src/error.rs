use crate::engine::{Operation, WaitStep};
use crate::wait::WaitTimeout;
use ec_ports::AccessError;

#[derive(Debug, thiserror::Error)]
pub enum EcError {
    /// The controller's ports could not be acquired.
    #[error(transparent)]
    Access(#[from] AccessError),

    /// A handshake wait ran out of attempts and the timeout policy did not
    /// allow the transaction to continue.
    #[error("{operation} of register {register:#04x}: {step}: {source}")]
    Timeout {
        operation: Operation,
        register: u8,
        step: WaitStep,
        #[source]
        source: WaitTimeout,
    },
}

impl EcError {
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
