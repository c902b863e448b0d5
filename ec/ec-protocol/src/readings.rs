//! Sensor readings and fan control in user-facing units.

use crate::engine::EmbeddedController;
use crate::error::EcError;
use crate::wait::Delay;
use core::fmt;
use ec_ports::PortIo;

/// A fan duty cycle in percent, `0..=100`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DutyPercent(u8);

/// A duty value outside `0..=100`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
#[error("duty {0} is not between 0 and 100")]
pub struct DutyOutOfRange(pub i64);

impl DutyPercent {
    pub const MIN: Self = Self(0);
    pub const MAX: Self = Self(100);

    #[must_use]
    pub const fn new(percent: u8) -> Option<Self> {
        if percent <= Self::MAX.0 {
            Some(Self(percent))
        } else {
            None
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for DutyPercent {
    type Error = DutyOutOfRange;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(DutyOutOfRange(value))
    }
}

impl fmt::Display for DutyPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Raw duty register value (`0..=255`) to percent, rounded to nearest.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn duty_to_percent(raw: u8) -> DutyPercent {
    let percent = (u16::from(raw) * 100 + 127) / 255;
    DutyPercent(percent as u8) // at most 100
}

/// Percent to raw duty register value, rounded to nearest (halves up).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn percent_to_duty(percent: DutyPercent) -> u8 {
    let raw = (u16::from(percent.0) * 255 + 50) / 100;
    raw as u8 // at most 255
}

/// Combine the two tachometer registers into the period count.
#[must_use]
pub const fn tachometer_count(hi: u8, lo: u8) -> u16 {
    u16::from_be_bytes([hi, lo])
}

/// Fan speed for a tachometer period count. A stopped fan reports 0.
#[must_use]
pub const fn rpm_from_count(count: u32, tachometer_constant: u32) -> u32 {
    match tachometer_constant.checked_div(count) {
        Some(rpm) => rpm,
        None => 0,
    }
}

/// A value the controller can report.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Reading {
    CpuTemp,
    GpuTemp,
    FanDuty,
    FanRpms,
}

impl Reading {
    /// All readings, in display order.
    pub const ALL: [Self; 4] = [Self::CpuTemp, Self::GpuTemp, Self::FanDuty, Self::FanRpms];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CpuTemp => "cpu-temp",
            Self::GpuTemp => "gpu-temp",
            Self::FanDuty => "fan-duty",
            Self::FanRpms => "fan-rpms",
        }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl<P, D> EmbeddedController<P, D>
where
    P: PortIo,
    D: Delay,
{
    /// CPU temperature as reported by the controller (°C on Clevo machines).
    ///
    /// # Errors
    /// See [`read_register`](Self::read_register).
    pub fn cpu_temperature(&mut self) -> Result<u8, EcError> {
        self.read_register(self.layout().registers.cpu_temp)
    }

    /// GPU temperature as reported by the controller.
    ///
    /// # Errors
    /// See [`read_register`](Self::read_register).
    pub fn gpu_temperature(&mut self) -> Result<u8, EcError> {
        self.read_register(self.layout().registers.gpu_temp)
    }

    /// Current fan duty.
    ///
    /// # Errors
    /// See [`read_register`](Self::read_register).
    pub fn fan_duty(&mut self) -> Result<DutyPercent, EcError> {
        self.read_register(self.layout().registers.fan_duty)
            .map(duty_to_percent)
    }

    /// Fan speed. High and low byte are two separate transactions, so the
    /// pair can tear if the controller updates in between.
    ///
    /// # Errors
    /// See [`read_register`](Self::read_register).
    pub fn fan_rpms(&mut self) -> Result<u32, EcError> {
        let registers = self.layout().registers;
        let hi = self.read_register(registers.fan_rpms_hi)?;
        let lo = self.read_register(registers.fan_rpms_lo)?;
        let count = tachometer_count(hi, lo);
        Ok(rpm_from_count(
            u32::from(count),
            self.layout().tachometer_constant,
        ))
    }

    /// Read `reading` as a plain number.
    ///
    /// # Errors
    /// See [`read_register`](Self::read_register).
    pub fn read(&mut self, reading: Reading) -> Result<u32, EcError> {
        match reading {
            Reading::CpuTemp => self.cpu_temperature().map(u32::from),
            Reading::GpuTemp => self.gpu_temperature().map(u32::from),
            Reading::FanDuty => self.fan_duty().map(|duty| u32::from(duty.get())),
            Reading::FanRpms => self.fan_rpms(),
        }
    }

    /// Set the fan duty.
    ///
    /// # Errors
    /// See [`write_register`](Self::write_register).
    pub fn set_fan_duty(&mut self, duty: DutyPercent) -> Result<(), EcError> {
        let raw = percent_to_duty(duty);
        log::info!("setting fan duty to {duty}% (raw {raw:#04x})");
        self.write_register(self.layout().registers.fan_duty_write, raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TimeoutPolicy;
    use crate::layout::CLEVO;
    use crate::sim::{NoDelay, SimulatedController};

    fn pct(p: u8) -> DutyPercent {
        DutyPercent::new(p).expect("in range")
    }

    #[test]
    fn duty_scaling_is_stable_for_every_raw_value() {
        for raw in 0..=u8::MAX {
            let back = percent_to_duty(duty_to_percent(raw));
            assert!(back.abs_diff(raw) <= 1, "raw {raw} came back as {back}");
        }
    }

    #[test]
    fn percent_survives_a_round_trip_exactly() {
        for p in 0..=100 {
            assert_eq!(duty_to_percent(percent_to_duty(pct(p))), pct(p));
        }
    }

    #[test]
    fn duty_scaling_boundaries() {
        assert_eq!(percent_to_duty(DutyPercent::MIN), 0);
        assert_eq!(percent_to_duty(DutyPercent::MAX), 255);
        assert_eq!(percent_to_duty(pct(50)), 128);
        assert_eq!(duty_to_percent(0), DutyPercent::MIN);
        assert_eq!(duty_to_percent(255), DutyPercent::MAX);
        assert_eq!(duty_to_percent(128), pct(50));
    }

    #[test]
    fn duty_percent_range() {
        assert_eq!(DutyPercent::try_from(0), Ok(DutyPercent::MIN));
        assert_eq!(DutyPercent::try_from(100), Ok(DutyPercent::MAX));
        assert_eq!(DutyPercent::try_from(-1), Err(DutyOutOfRange(-1)));
        assert_eq!(DutyPercent::try_from(101), Err(DutyOutOfRange(101)));
        assert_eq!(DutyPercent::try_from(256), Err(DutyOutOfRange(256)));
        assert_eq!(DutyPercent::new(101), None);
    }

    #[test]
    fn rpm_derivation() {
        let k = CLEVO.tachometer_constant;
        assert_eq!(rpm_from_count(0, k), 0);
        assert_eq!(rpm_from_count(1, k), 2_156_220);
        assert_eq!(rpm_from_count(2_156_220, k), 1);
        assert_eq!(rpm_from_count(3000, k), 718);
        assert_eq!(tachometer_count(0x0B, 0xB8), 3000);
    }

    #[test]
    fn fan_rpms_reads_high_then_low() {
        let mut sim = SimulatedController::new(CLEVO)
            .with_register(0xD0, 0x0B)
            .with_register(0xD1, 0xB8);
        let rpms = EmbeddedController::new(&mut sim, NoDelay, CLEVO, TimeoutPolicy::Lenient)
            .fan_rpms()
            .expect("rpm");
        assert_eq!(rpms, 718);

        let addresses: Vec<u8> = sim
            .writes()
            .filter(|&(port, _)| port == CLEVO.data_port)
            .map(|(_, value)| value)
            .collect();
        assert_eq!(addresses, [0xD0, 0xD1]);
    }

    #[test]
    fn stopped_fan_reads_zero_rpm() {
        let mut sim = SimulatedController::new(CLEVO);
        let rpms = EmbeddedController::new(&mut sim, NoDelay, CLEVO, TimeoutPolicy::Lenient)
            .read(Reading::FanRpms)
            .expect("rpm");
        assert_eq!(rpms, 0);
    }

    #[test]
    fn set_fan_duty_writes_the_setpoint_register() {
        let mut sim = SimulatedController::new(CLEVO).with_register(0xCE, 0x33);
        EmbeddedController::new(&mut sim, NoDelay, CLEVO, TimeoutPolicy::Lenient)
            .set_fan_duty(pct(100))
            .expect("write");
        assert_eq!(sim.register(0x01), 0xFF);
        // The read-side duty register is left alone.
        assert_eq!(sim.register(0xCE), 0x33);
    }

    #[test]
    fn labels_in_display_order() {
        let labels: Vec<_> = Reading::ALL.iter().map(|r| r.label()).collect();
        assert_eq!(labels, ["cpu-temp", "gpu-temp", "fan-duty", "fan-rpms"]);
    }
}
