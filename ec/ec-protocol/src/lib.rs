//! # Embedded Controller Protocol
//!
//! Register access to an ACPI-style embedded controller over two I/O ports:
//! the status/command port (`EC_SC`) and the data port (`EC_DATA`).
//!
//! ## Handshake
//!
//! The host may only write while the controller's input buffer is empty
//! (IBF=0) and may only read the data port once the controller filled its
//! output buffer (OBF=1):
//!
//! ```text
//! read register                       write register
//!   wait IBF=0                          wait IBF=0
//!   EC_SC   <- read command             EC_SC   <- write command
//!   wait IBF=0                          wait IBF=0
//!   EC_DATA <- address                  EC_DATA <- address
//!   wait OBF=1                          wait IBF=0
//!   EC_DATA -> value                    EC_DATA <- value
//!                                       wait IBF=0
//! ```
//!
//! Every wait is bounded by the layout's [`PollTiming`](layout::PollTiming).
//! What happens when one runs out is decided by the [`TimeoutPolicy`].
//!
//! ## Layout
//!
//! Ports, command codes, register addresses and timing come from a
//! [`ControllerLayout`]; [`CLEVO`] is the table for Clevo laptops.

pub mod engine;
mod error;
pub mod layout;
pub mod readings;
#[cfg(any(test, feature = "sim"))]
pub mod sim;
pub mod status;
pub mod wait;

pub use engine::{EmbeddedController, Operation, TimeoutPolicy, WaitStep};
pub use error::EcError;
pub use layout::{CLEVO, ControllerLayout};
pub use readings::{DutyOutOfRange, DutyPercent, Reading};
pub use status::{EcStatus, StatusFlag};
pub use wait::{Delay, ThreadSleep, WaitTimeout};
