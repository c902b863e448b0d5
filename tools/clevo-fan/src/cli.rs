//! `getopt_long`-style option scanning.
//!
//! Supports bundled short flags (`-bc`), short options with an attached or a
//! separate value (`-d50`, `-d 50`), long options with `=` or a separate value
//! (`--fan-duty=50`, `--fan-duty 50`) and `--` as the end of options. Options
//! are yielded in command line order so that `-h` and `-v` act the moment
//! they are seen.

/// One option a command accepts.
#[derive(Debug, Copy, Clone)]
pub struct OptSpec<T> {
    pub id: T,
    pub short: char,
    pub long: &'static str,
    pub takes_value: bool,
}

impl<T> OptSpec<T> {
    #[must_use]
    pub const fn flag(id: T, short: char, long: &'static str) -> Self {
        Self {
            id,
            short,
            long,
            takes_value: false,
        }
    }

    #[must_use]
    pub const fn value(id: T, short: char, long: &'static str) -> Self {
        Self {
            id,
            short,
            long,
            takes_value: true,
        }
    }
}

/// An option found on the command line.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Opt<T> {
    pub id: T,
    pub value: Option<String>,
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum UsageError {
    #[error("unrecognized option '{0}'")]
    UnknownOption(String),
    #[error("option '{0}' requires an argument")]
    MissingValue(String),
    #[error("option '{0}' doesn't allow an argument")]
    UnexpectedValue(String),
    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),
    #[error("missing required option {0}")]
    MissingOption(&'static str),
}

/// Iterator over the options in `args`.
///
/// Stops after the first error.
pub struct Options<'a, T: 'static> {
    args: &'a [String],
    specs: &'static [OptSpec<T>],
    index: usize,
    /// Position inside a bundle of short options: `(argument, byte offset)`.
    bundle: Option<(usize, usize)>,
    failed: bool,
}

impl<'a, T> Options<'a, T>
where
    T: Copy + 'static,
{
    #[must_use]
    pub const fn new(args: &'a [String], specs: &'static [OptSpec<T>]) -> Self {
        Self {
            args,
            specs,
            index: 0,
            bundle: None,
            failed: false,
        }
    }

    fn by_short(&self, short: char) -> Option<&'static OptSpec<T>> {
        self.specs.iter().find(|spec| spec.short == short)
    }

    fn by_long(&self, long: &str) -> Option<&'static OptSpec<T>> {
        self.specs.iter().find(|spec| spec.long == long)
    }

    fn next_arg(&mut self) -> Option<&'a String> {
        let arg = self.args.get(self.index)?;
        self.index += 1;
        Some(arg)
    }

    fn short(&mut self, arg_index: usize, offset: usize) -> Result<Opt<T>, UsageError> {
        let args = self.args;
        let arg = &args[arg_index];
        let rest = &arg[offset..];
        let Some(short) = rest.chars().next() else {
            self.bundle = None;
            return Err(UsageError::UnknownOption(arg.clone()));
        };
        let after = offset + short.len_utf8();

        let spec = self
            .by_short(short)
            .ok_or_else(|| UsageError::UnknownOption(format!("-{short}")))?;

        if spec.takes_value {
            self.bundle = None;
            let value = if after < arg.len() {
                arg[after..].to_owned()
            } else {
                self.next_arg()
                    .cloned()
                    .ok_or_else(|| UsageError::MissingValue(format!("-{short}")))?
            };
            return Ok(Opt {
                id: spec.id,
                value: Some(value),
            });
        }

        self.bundle = (after < arg.len()).then_some((arg_index, after));
        Ok(Opt {
            id: spec.id,
            value: None,
        })
    }

    fn long(&mut self, body: &str) -> Result<Opt<T>, UsageError> {
        let (name, inline) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        let spec = self
            .by_long(name)
            .ok_or_else(|| UsageError::UnknownOption(format!("--{name}")))?;

        let value = match (spec.takes_value, inline) {
            (true, Some(value)) => Some(value.to_owned()),
            (true, None) => Some(
                self.next_arg()
                    .cloned()
                    .ok_or_else(|| UsageError::MissingValue(format!("--{name}")))?,
            ),
            (false, Some(_)) => return Err(UsageError::UnexpectedValue(format!("--{name}"))),
            (false, None) => None,
        };

        Ok(Opt { id: spec.id, value })
    }

    fn scan(&mut self) -> Option<Result<Opt<T>, UsageError>> {
        if let Some((arg_index, offset)) = self.bundle {
            return Some(self.short(arg_index, offset));
        }

        let arg_index = self.index;
        let arg = self.next_arg()?;

        if arg == "--" {
            return self
                .next_arg()
                .map(|extra| Err(UsageError::UnexpectedArgument(extra.clone())));
        }
        if let Some(body) = arg.strip_prefix("--") {
            return Some(self.long(body));
        }
        if arg.len() > 1 && arg.starts_with('-') {
            return Some(self.short(arg_index, 1));
        }
        Some(Err(UsageError::UnexpectedArgument(arg.clone())))
    }
}

impl<T> Iterator for Options<'_, T>
where
    T: Copy + 'static,
{
    type Item = Result<Opt<T>, UsageError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let item = self.scan();
        if matches!(item, Some(Err(_))) {
            self.failed = true;
        }
        item
    }
}
