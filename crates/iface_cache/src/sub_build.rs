//! Isolated build configuration for interface rebuilds.

use std::path::Path;

use iface_config::{BuildOptions, InputKind};

/// Derives the build options for rebuilding module `module_name` from the
/// host's active options.
///
/// Only what locates inputs and shapes generated code is inherited: search
/// paths, SDK, resource directory, target and debugger support. Everything
/// else starts from defaults so nothing the host was doing for its own
/// compilation leaks into the artifact. The interface's own flags are
/// applied on top of this later.
pub fn derive_sub_build(host: &BuildOptions, module_name: &str, cache_dir: Option<&Path>) -> BuildOptions {
    BuildOptions {
        module_name: module_name.to_string(),
        input_kind: InputKind::InterfaceText,
        module_cache_path: cache_dir.map(Path::to_path_buf),
        import_search_paths: host.import_search_paths.clone(),
        framework_search_paths: host.framework_search_paths.clone(),
        sdk_path: host.sdk_path.clone(),
        resource_dir: host.resource_dir.clone(),
        target_triple: host.target_triple.clone(),
        debugger_support: host.debugger_support,
        suppress_warnings: true,
        // Interfaces print every bridged attribute explicitly.
        bridged_attrs_require_foundation: false,
        ..BuildOptions::default()
    }
}

/// Points `options` at one interface input and one artifact output.
pub fn configure_inputs_and_outputs(options: &mut BuildOptions, input: &Path, output: &Path) {
    options.input_path = Some(input.to_path_buf());
    options.module_output_path = Some(output.to_path_buf());
}
