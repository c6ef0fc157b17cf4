//! Shared command argument builder for backend clients.

/// Builder for assembling backend tool arguments as an explicit vector.
///
/// Each pushed value is one argument token, so paths containing spaces
/// reach the tool intact.
#[derive(Debug, Default)]
pub struct CommandArgsBuilder {
    args: Vec<String>,
}

impl CommandArgsBuilder {
    /// Create a new, empty builder.
    pub fn new() -> Self {
        Self { args: Vec::new() }
    }

    /// Append a raw argument to the builder.
    pub fn push_arg<S: Into<String>>(&mut self, arg: S) {
        self.args.push(arg.into());
    }

    /// Append a flag with no value.
    pub fn push_flag(&mut self, flag: &str) {
        self.args.push(flag.into());
    }

    /// Append a flag only when `enabled` is true.
    pub fn push_flag_if(&mut self, flag: &str, enabled: bool) {
        if enabled {
            self.push_flag(flag);
        }
    }

    /// Append a flag and its value as separate arguments, if the value is not empty.
    pub fn push_flag_value(&mut self, flag: &str, value: &str) {
        if value.is_empty() {
            return;
        }
        self.args.push(flag.into());
        self.args.push(value.into());
    }

    /// Append an optional argument.
    pub fn push_opt_arg(&mut self, arg: Option<String>) {
        if let Some(arg) = arg {
            self.args.push(arg);
        }
    }

    /// Return the collected arguments.
    pub fn into_args(self) -> Vec<String> {
        self.args
    }
}
