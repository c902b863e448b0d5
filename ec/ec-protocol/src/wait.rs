use crate::layout::PollTiming;
use crate::status::StatusFlag;
use core::time::Duration;
use log::trace;

/// Source of the pause between two status reads.
pub trait Delay {
    fn delay(&mut self, duration: Duration);
}

/// Blocks the calling thread with [`std::thread::sleep`].
#[derive(Debug, Default, Copy, Clone)]
pub struct ThreadSleep;

impl Delay for ThreadSleep {
    #[inline]
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

impl<T> Delay for &mut T
where
    T: Delay + ?Sized,
{
    #[inline]
    fn delay(&mut self, duration: Duration) {
        (**self).delay(duration);
    }
}

/// A status flag did not reach the expected value within the attempt budget.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[error("timed out waiting for {flag}={} after {attempts} status reads (last status {last_status:#04x})", bit(.expected))]
pub struct WaitTimeout {
    pub flag: StatusFlag,
    pub expected: bool,
    pub attempts: u32,
    pub last_status: u8,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn bit(value: &bool) -> u8 {
    u8::from(*value)
}

/// Poll `read_status` until `flag` reads as `expected`.
///
/// Performs at most `timing.attempts` reads, pausing `timing.interval`
/// between two consecutive reads. A match on any read, including the last
/// one, is a success.
///
/// # Errors
/// [`WaitTimeout`] once every attempt has been used up.
pub fn poll_flag<F, D>(
    mut read_status: F,
    delay: &mut D,
    flag: StatusFlag,
    expected: bool,
    timing: &PollTiming,
) -> Result<(), WaitTimeout>
where
    F: FnMut() -> u8,
    D: Delay + ?Sized,
{
    let mut last_status = 0;
    for attempt in 1..=timing.attempts {
        last_status = read_status();
        if flag.matches(last_status, expected) {
            trace!("{flag}={} after {attempt} read(s)", u8::from(expected));
            return Ok(());
        }
        if attempt < timing.attempts {
            delay.delay(timing.interval);
        }
    }

    Err(WaitTimeout {
        flag,
        expected,
        attempts: timing.attempts,
        last_status,
    })
}
