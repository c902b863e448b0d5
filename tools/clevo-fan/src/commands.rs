use crate::cli::{OptSpec, Options, UsageError};
use crate::error::{CliError, ValidationError};
use crate::usage;
use crate::{Exit, VERSION};
use ec_protocol::wait::Delay;
use ec_protocol::{DutyPercent, EcError, EmbeddedController, Reading};
use ec_ports::PortIo;
use std::io::Write;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum GetOpt {
    Bare,
    Select(Reading),
    Help,
    Version,
}

const GET_OPTIONS: &[OptSpec<GetOpt>] = &[
    OptSpec::flag(GetOpt::Bare, 'b', "bare"),
    OptSpec::flag(GetOpt::Select(Reading::CpuTemp), 'c', "cpu-temp"),
    OptSpec::flag(GetOpt::Select(Reading::GpuTemp), 'g', "gpu-temp"),
    OptSpec::flag(GetOpt::Select(Reading::FanDuty), 'd', "fan-duty"),
    OptSpec::flag(GetOpt::Select(Reading::FanRpms), 'r', "fan-rpms"),
    OptSpec::flag(GetOpt::Help, 'h', "help"),
    OptSpec::flag(GetOpt::Version, 'v', "version"),
];

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum SetOpt {
    FanDuty,
    Help,
    Version,
}

const SET_OPTIONS: &[OptSpec<SetOpt>] = &[
    OptSpec::value(SetOpt::FanDuty, 'd', "fan-duty"),
    OptSpec::flag(SetOpt::Help, 'h', "help"),
    OptSpec::flag(SetOpt::Version, 'v', "version"),
];

/// `get`: print the selected readings, or all of them.
///
/// # Errors
/// Usage errors, controller errors, and failures writing to `out`.
pub fn get<P, D, C>(
    prog: &str,
    args: &[String],
    connect: C,
    out: &mut impl Write,
) -> Result<Exit, CliError>
where
    P: PortIo,
    D: Delay,
    C: FnOnce() -> Result<EmbeddedController<P, D>, EcError>,
{
    let mut bare = false;
    let mut selected = Vec::new();

    for opt in Options::new(args, GET_OPTIONS) {
        match opt?.id {
            GetOpt::Bare => bare = true,
            GetOpt::Select(reading) => selected.push(reading),
            GetOpt::Help => {
                usage::get_usage(out, prog)?;
                return Ok(Exit::Success);
            }
            GetOpt::Version => {
                writeln!(out, "{VERSION}")?;
                return Ok(Exit::Success);
            }
        }
    }

    let readings: Vec<Reading> = Reading::ALL
        .into_iter()
        .filter(|reading| selected.is_empty() || selected.contains(reading))
        .collect();

    let mut ec = connect().map_err(CliError::Init)?;
    for reading in readings {
        let value = ec.read(reading).map_err(CliError::Read)?;
        if bare {
            writeln!(out, "{value}")?;
        } else {
            writeln!(out, "{reading}: {value}")?;
        }
    }

    Ok(Exit::Success)
}

/// `set`: validate the requested duty, then write it.
///
/// # Errors
/// Usage and validation errors (the controller is not opened then),
/// controller errors, and failures writing to `out`.
pub fn set<P, D, C>(
    prog: &str,
    args: &[String],
    connect: C,
    out: &mut impl Write,
) -> Result<Exit, CliError>
where
    P: PortIo,
    D: Delay,
    C: FnOnce() -> Result<EmbeddedController<P, D>, EcError>,
{
    let mut duty = None;

    for opt in Options::new(args, SET_OPTIONS) {
        let opt = opt?;
        match opt.id {
            SetOpt::FanDuty => duty = Some(parse_duty(opt.value.as_deref().unwrap_or_default())?),
            SetOpt::Help => {
                usage::set_usage(out, prog)?;
                return Ok(Exit::Success);
            }
            SetOpt::Version => {
                writeln!(out, "{VERSION}")?;
                return Ok(Exit::Success);
            }
        }
    }

    let duty = duty.ok_or(UsageError::MissingOption("-d/--fan-duty"))?;

    let mut ec = connect().map_err(CliError::Init)?;
    ec.set_fan_duty(duty).map_err(CliError::Write)?;
    Ok(Exit::Success)
}

/// Parse a duty percentage as given on the command line.
///
/// # Errors
/// [`ValidationError`] if `arg` is not a base-10 integer in `0..=100`.
pub fn parse_duty(arg: &str) -> Result<DutyPercent, ValidationError> {
    let value: i64 = arg
        .trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber(arg.to_owned()))?;
    DutyPercent::try_from(value).map_err(|_| ValidationError::OutOfRange(arg.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duty_bounds_are_inclusive() {
        assert_eq!(parse_duty("0"), Ok(DutyPercent::MIN));
        assert_eq!(parse_duty("100"), Ok(DutyPercent::MAX));
        assert_eq!(parse_duty(" 42\n").map(DutyPercent::get), Ok(42));
        assert_eq!(parse_duty("+7").map(DutyPercent::get), Ok(7));
    }

    #[test]
    fn duty_rejects_out_of_range() {
        assert_eq!(parse_duty("-1"), Err(ValidationError::OutOfRange("-1".into())));
        assert_eq!(parse_duty("101"), Err(ValidationError::OutOfRange("101".into())));
    }

    #[test]
    fn duty_rejects_non_numbers() {
        assert_eq!(parse_duty("abc"), Err(ValidationError::NotANumber("abc".into())));
        assert_eq!(parse_duty(""), Err(ValidationError::NotANumber(String::new())));
        assert_eq!(parse_duty("50%"), Err(ValidationError::NotANumber("50%".into())));
        assert_eq!(
            parse_duty("99999999999999999999"),
            Err(ValidationError::NotANumber("99999999999999999999".into()))
        );
    }

    #[test]
    fn validation_messages() {
        assert_eq!(ValidationError::NotANumber("abc".into()).to_string(), "Invalid duty: abc");
        assert_eq!(
            ValidationError::OutOfRange("101".into()).to_string(),
            "Invalid duty: 101. Must be between 0 and 100"
        );
    }
}
