//! The full build configuration of one compilation.

use crate::types::OptLevel;
use std::path::PathBuf;

/// What kind of input a compilation consumes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputKind {
    /// Ordinary source files.
    #[default]
    Source,
    /// A textual module interface.
    InterfaceText,
}

/// Every option that shapes a compilation.
///
/// The host has one active `BuildOptions`; each interface rebuild gets its
/// own copy derived from it and then overridden by the flags the interface
/// file carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Name of the module being built.
    pub module_name: String,
    /// Library name downstream code should link against, if different.
    pub module_link_name: Option<String>,
    /// Kind of the primary input.
    pub input_kind: InputKind,
    /// The primary input file.
    pub input_path: Option<PathBuf>,
    /// Where the compiled module artifact is written.
    pub module_output_path: Option<PathBuf>,
    /// Shared cache directory for compiled dependencies.
    pub module_cache_path: Option<PathBuf>,
    /// Directories searched for imported modules.
    pub import_search_paths: Vec<PathBuf>,
    /// Directories searched for framework bundles.
    pub framework_search_paths: Vec<PathBuf>,
    /// SDK root.
    pub sdk_path: Option<PathBuf>,
    /// Runtime resource directory.
    pub resource_dir: Option<PathBuf>,
    /// Target triple.
    pub target_triple: String,
    /// Effective language version, if pinned.
    pub language_version: Option<String>,
    /// Conditional compilation flags (`-D`).
    pub conditional_flags: Vec<String>,
    /// Optimization mode for generated code.
    pub optimization: OptLevel,
    /// Whether the module is built for library evolution.
    pub library_evolution: bool,
    /// Whether internal declarations are exposed for testing.
    pub enable_testing: bool,
    /// Whether the build serves a debugger or interactive session.
    pub debugger_support: bool,
    /// Drop warnings instead of reporting them.
    pub suppress_warnings: bool,
    /// Whether bridged attributes are only printed when the foundation
    /// library is imported.
    pub bridged_attrs_require_foundation: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            module_name: String::new(),
            module_link_name: None,
            input_kind: InputKind::Source,
            input_path: None,
            module_output_path: None,
            module_cache_path: None,
            import_search_paths: Vec::new(),
            framework_search_paths: Vec::new(),
            sdk_path: None,
            resource_dir: None,
            target_triple: String::new(),
            language_version: None,
            conditional_flags: Vec::new(),
            optimization: OptLevel::None,
            library_evolution: false,
            enable_testing: false,
            debugger_support: false,
            suppress_warnings: false,
            bridged_attrs_require_foundation: true,
        }
    }
}
