//! Invocation prefix shared by every command sent to a backend client.

use super::args::CommandArgsBuilder;
use super::settings::ProvisionerSettings;
use crate::executor::{CommandSpec, OutputMode};

/// A backend client binary plus the arguments every invocation starts with.
///
/// s3cmd takes `-c <file>`, icgc-get takes `--config <file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCommand {
    program: String,
    config_flag: &'static str,
    config_file: String,
    output: OutputMode,
}

impl ClientCommand {
    pub fn new(settings: &ProvisionerSettings, config_flag: &'static str, output: OutputMode) -> Self {
        Self {
            program: settings.client.clone(),
            config_flag,
            config_file: settings.config_file.clone(),
            output,
        }
    }

    /// Returns a builder already holding the config-file arguments.
    pub fn args(&self) -> CommandArgsBuilder {
        let mut builder = CommandArgsBuilder::new();
        builder.push_flag_value(self.config_flag, &self.config_file);
        builder
    }

    /// Builds a spec for this client from a finished argument builder.
    pub fn spec(&self, builder: CommandArgsBuilder) -> CommandSpec {
        CommandSpec::new(self.program.clone(), builder.into_args()).with_output(self.output)
    }
}
