//! Static strategy pattern for CLI commands.
//!
//! Each subcommand is its own strategy type implementing [`CommandStrategy`],
//! so dispatch is monomorphized at compile time and every command defines its
//! own input type.

use std::path::Path;

use palaver_config::Config;
use tracing::info;

mod chat;
mod eval;
mod init;
mod templates;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use eval::{EvalInput, EvalStrategy};
pub use init::InitStrategy;
pub use templates::{TemplatesInput, TemplatesStrategy};
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Load the app configuration from an explicit path or the default location.
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = path.map_or_else(Config::load, Config::load_from)?;
    info!("Loaded configuration");
    Ok(config)
}
