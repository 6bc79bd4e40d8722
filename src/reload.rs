//! Router reload trigger.

use anyhow::{Context, Result};
use tracing::{debug, info};

#[cfg(test)]
use mockall::automock;

use crate::cmd_abstraction::{CommandExecutor, RealCommandExecutor};
use crate::config::ReloadConfig;

/// Something that makes the router pick up the new route file.
#[cfg_attr(test, automock)]
pub trait Reloader: Send + Sync {
    fn reload(&self) -> Result<()>;
}

/// Runs the configured reload command (`birdc configure` by default).
pub struct CommandReloader<E: CommandExecutor = RealCommandExecutor> {
    executor: E,
    command: String,
    args: Vec<String>,
}

impl CommandReloader<RealCommandExecutor> {
    pub fn from_config(config: &ReloadConfig) -> Self {
        Self::with_executor(RealCommandExecutor::new(), config)
    }
}

impl<E: CommandExecutor> CommandReloader<E> {
    pub fn with_executor(executor: E, config: &ReloadConfig) -> Self {
        Self {
            executor,
            command: config.command.clone(),
            args: config.args.clone(),
        }
    }

    fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl<E: CommandExecutor> Reloader for CommandReloader<E> {
    fn reload(&self) -> Result<()> {
        let command_line = self.command_line();
        info!("Reloading router configuration ({}) ...", command_line);

        let output = self
            .executor
            .execute(&self.command, &self.args)
            .with_context(|| format!("Failed to execute {}", command_line))?;

        if !output.success {
            let detail = output.detail();
            match output.code {
                Some(code) => anyhow::bail!("{} exited with status {}: {}", command_line, code, detail),
                None => anyhow::bail!("{} was terminated by a signal: {}", command_line, detail),
            }
        }

        debug!("{} output: {}", command_line, output.stdout.trim());
        info!("Router reload successful.");
        Ok(())
    }
}
