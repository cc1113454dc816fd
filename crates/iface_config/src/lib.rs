//! Host configuration and build options for module-interface rebuilds.
//!
//! This crate reads the host's `iface.toml` into a strongly-typed
//! [`HostConfig`], resolves it into the active [`BuildOptions`], and parses the
//! flag strings embedded in interface files back into [`BuildOptions`].

#![warn(missing_docs)]

pub mod args;
pub mod error;
pub mod loader;
pub mod options;
pub mod types;

pub use args::{parse_args, tokenize_command_line};
pub use error::{ArgsError, ConfigError};
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use options::{BuildOptions, InputKind};
pub use types::*;
