//! Idempotent bucket provisioning.
//!
//! Check-then-create is not atomic: another actor may create the bucket
//! between the two commands. The backend's "already exists" exit code is
//! therefore treated as success rather than an error.

use anyhow::Result;
use tracing::info;

use crate::executor::{CommandExecutor, EchoTarget};
use crate::outcome::{ExitCodeTable, TransferOutcome};
use crate::provision::ClientCommand;

/// Ensures remote buckets exist before uploading into them.
pub struct BucketManager<'a> {
    executor: &'a dyn CommandExecutor,
    client: &'a ClientCommand,
    table: ExitCodeTable,
    create_echo: EchoTarget,
}

impl<'a> BucketManager<'a> {
    pub fn new(
        executor: &'a dyn CommandExecutor,
        client: &'a ClientCommand,
        table: ExitCodeTable,
    ) -> Self {
        Self {
            executor,
            client,
            table,
            create_echo: EchoTarget::Console,
        }
    }

    /// Sets where the output of the create command is echoed.
    #[must_use]
    pub fn with_create_echo(mut self, echo: EchoTarget) -> Self {
        self.create_echo = echo;
        self
    }

    /// Returns true if `info <bucket>` exits with code 0.
    ///
    /// The info output only ever goes to the diagnostic log.
    pub fn bucket_exists(&self, bucket: &str) -> Result<bool> {
        let mut args = self.client.args();
        args.push_flag("info");
        args.push_arg(bucket);
        let spec = self.client.spec(args).with_echo(EchoTarget::Diagnostic);
        let result = self.executor.execute(&spec)?;
        Ok(result.success())
    }

    /// Runs `mb <bucket>` and reports whether the bucket now exists.
    pub fn create_bucket(&self, bucket: &str) -> Result<bool> {
        let mut args = self.client.args();
        args.push_flag("mb");
        args.push_arg(bucket);
        let spec = self.client.spec(args).with_echo(self.create_echo);
        let result = self.executor.execute(&spec)?;

        if self.table.is_already_exists(result.code) {
            info!("bucket {} was created concurrently", bucket);
            return Ok(true);
        }
        match self.table.classify(&result) {
            TransferOutcome::Success => Ok(true),
            outcome => Ok(outcome.into_result(&spec.to_string(), &result)?),
        }
    }

    /// Returns true if the bucket exists, creating it when it does not.
    pub fn ensure_bucket_exists(&self, bucket: &str) -> Result<bool> {
        if self.bucket_exists(bucket)? {
            info!("bucket {} exists", bucket);
            return Ok(true);
        }
        info!("creating bucket {}", bucket);
        let created = self.create_bucket(bucket)?;
        if !created {
            info!("could not create bucket {}", bucket);
        }
        Ok(created)
    }
}
