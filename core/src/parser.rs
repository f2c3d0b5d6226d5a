//! Argument scanning: subcommand chains, long and short options, grouped
//! short options, and positional collection.

use std::process;

use tracing::debug;

use crate::error::{ParseError, Result};
use crate::flag::FlagKey;
use crate::flagset::{ErrorHandling, FlagSet};

/// Exit status used by [`ErrorHandling::ExitOnError`].
pub const EXIT_STATUS: i32 = 2;

impl FlagSet {
    /// Parses `arguments` (without the program name) against the active
    /// scope.
    ///
    /// Leading tokens naming subcommands are consumed first, each narrowing
    /// the scope to its own flags. The remaining tokens are options or
    /// positional arguments; positionals are available from
    /// [`args`](FlagSet::args) afterwards. Flags set by earlier tokens keep
    /// their values when a later token fails.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::HelpRequested`] when `--help`/`-h` is given and
    /// not registered. Other failures are written to the output and then
    /// returned, exit the process, or panic, depending on the
    /// [`ErrorHandling`] policy.
    ///
    /// ```
    /// use flagset_core::{ErrorHandling, FlagSet, ParseError};
    ///
    /// let mut flags = FlagSet::new("tool", ErrorHandling::ContinueOnError);
    /// flags.set_output(std::io::sink());
    /// flags.bool("all", Some('a'), false, "", None);
    ///
    /// assert_eq!(flags.parse(["-xyz"]), Err(ParseError::UnrecognizedAlias('x')));
    /// assert_eq!(flags.parse(["--help"]), Err(ParseError::HelpRequested));
    /// ```
    pub fn parse<I, S>(&mut self, arguments: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parsed = true;
        self.index = 0;

        let mut arguments: Vec<String> = arguments.into_iter().map(Into::into).collect();
        let entered = self.enter_sub_commands(&arguments)?;
        arguments.drain(..entered);
        self.args = arguments;

        while self.index < self.args.len() {
            if let Err(err) = self.parse_one() {
                return Err(self.dispatch(err));
            }
        }

        Ok(())
    }

    /// Walks the leading run of subcommand tokens, returning how many were
    /// consumed.
    fn enter_sub_commands(&mut self, arguments: &[String]) -> Result<usize> {
        let mut entered = 0;
        for token in arguments {
            let Some(slot) = self.sub_command_slot(token) else {
                break;
            };

            let flag = self.flags_mut().slot_mut(slot);
            let name = flag.name.clone();
            let outcome = flag.value.set("true");

            self.name.push(' ');
            self.name.push_str(&name);

            if let Err(source) = outcome {
                let err = self.fail(ParseError::InvalidValue {
                    name,
                    value: "true".to_string(),
                    source,
                });
                return Err(self.dispatch(err));
            }

            debug!(sub_command = %name, scope = %self.name, "Entered subcommand");
            self.scope.push(slot);
            entered += 1;
        }
        Ok(entered)
    }

    fn sub_command_slot(&self, token: &str) -> Option<usize> {
        let registry = self.flags();
        let slot = registry.position(FlagKey::Name(token)).or_else(|| {
            single_char(token).and_then(|alias| registry.position(FlagKey::Alias(alias)))
        })?;
        registry.slot(slot).is_sub_command.then_some(slot)
    }

    /// Slot of a non-subcommand flag in the active scope.
    fn option_slot(&self, key: FlagKey<'_>) -> Option<usize> {
        let registry = self.flags();
        registry
            .position(key)
            .filter(|&slot| !registry.slot(slot).is_sub_command)
    }

    fn parse_one(&mut self) -> Result<()> {
        let token = &self.args[self.index];
        if token.len() < 2 || !token.starts_with('-') {
            self.index += 1;
            return Ok(());
        }

        let token = self.args.remove(self.index);
        let long = token.starts_with("--");
        let body = if long { &token[2..] } else { &token[1..] };

        if body.is_empty() || body.starts_with(['-', '=']) {
            return Err(self.fail(ParseError::InvalidSyntax(token.clone())));
        }

        let (name, value) = match body.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (body, None),
        };

        if long {
            self.parse_long(name, value)
        } else {
            self.parse_short(name, value)
        }
    }

    fn parse_long(&mut self, name: &str, value: Option<&str>) -> Result<()> {
        match self.option_slot(FlagKey::Name(name)) {
            Some(slot) => self.set_value(slot, value),
            None if name == "help" => Err(self.help()),
            None => Err(self.fail(ParseError::UnrecognizedLong(name.to_string()))),
        }
    }

    fn parse_short(&mut self, group: &str, value: Option<&str>) -> Result<()> {
        if let Some(value) = value {
            let Some(alias) = single_char(group) else {
                return Err(self.fail(ParseError::AmbiguousShortValue(group.to_string())));
            };
            return match self.option_slot(FlagKey::Alias(alias)) {
                Some(slot) => self.set_value(slot, Some(value)),
                None => Err(self.fail(ParseError::UnrecognizedShort(group.to_string()))),
            };
        }

        for alias in group.chars() {
            match self.option_slot(FlagKey::Alias(alias)) {
                Some(slot) => self.set_value(slot, None)?,
                None if alias == 'h' => return Err(self.help()),
                None => return Err(self.fail(ParseError::UnrecognizedAlias(alias))),
            }
        }
        Ok(())
    }

    /// Assigns a value to the flag at `slot` of the active scope and runs its
    /// callback.
    ///
    /// Boolean flags toggle unless `explicit` is given. Other flags take
    /// `explicit` or else consume the next argument, whatever it looks like.
    fn set_value(&mut self, slot: usize, explicit: Option<&str>) -> Result<()> {
        let flag = self.flags().slot(slot);
        let name = flag.name.clone();

        let raw = if flag.value.is_bool_flag() {
            match explicit {
                Some(value) => value.to_string(),
                None => match flag.value.get().downcast_ref::<bool>() {
                    Some(current) => (!current).to_string(),
                    None => return Err(self.fail(ParseError::NotBoolean(name))),
                },
            }
        } else if let Some(value) = explicit {
            value.to_string()
        } else if self.index < self.args.len() {
            self.args.remove(self.index)
        } else {
            return Err(self.fail(ParseError::MissingArgument(name)));
        };

        let flag = self.flags_mut().slot_mut(slot);
        let mut outcome = flag.value.set(&raw);
        if outcome.is_ok() {
            if let Some(callback) = &flag.callback {
                outcome = callback(flag.value.as_ref());
            }
        }

        match outcome {
            Ok(()) => {
                debug!(flag = %name, value = %raw, "Set flag");
                Ok(())
            }
            Err(source) => Err(self.fail(ParseError::InvalidValue {
                name,
                value: raw,
                source,
            })),
        }
    }

    fn help(&self) -> ParseError {
        debug!(scope = %self.name, "Help requested");
        self.usage();
        ParseError::HelpRequested
    }

    /// Reports a failure on the output and hands it back.
    fn fail(&self, err: ParseError) -> ParseError {
        self.write_output(&format!("{err}\n"));
        err
    }

    /// Applies the error-handling policy. Help requests pass through.
    fn dispatch(&self, err: ParseError) -> ParseError {
        if err.is_help() {
            return err;
        }
        debug!(scope = %self.name, error = %err, policy = ?self.error_handling, "Parse failed");
        match self.error_handling {
            ErrorHandling::ContinueOnError => err,
            ErrorHandling::ExitOnError => process::exit(EXIT_STATUS),
            ErrorHandling::PanicOnError => panic!("{err}"),
        }
    }
}

fn single_char(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
