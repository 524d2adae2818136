//! Config command - Show the effective configuration and where it came from

use std::path::Path;

use verdict_core::Resolved;

/// Describe every setting with the layer that set it
pub fn describe(resolved: &Resolved, config_file: Option<&Path>) -> String {
    let tool = &resolved.config.tool;
    let timeout = match tool.timeout {
        Some(t) if !t.is_zero() => format!("{:?}", t),
        _ => "(none)".to_string(),
    };

    let mut out = String::new();
    out.push_str("Verdict Configuration\n");
    out.push_str("=====================\n\n");
    out.push_str("Tool Settings:\n");
    out.push_str(&format!(
        "  path: {}  (from {})\n",
        tool.path, resolved.tool_path
    ));
    out.push_str(&format!(
        "  timeout: {}  (from {})\n",
        timeout, resolved.timeout
    ));

    if let Some(path) = config_file {
        out.push('\n');
        out.push_str(&format!("Config file: {}\n", path.display()));
        if path.exists() {
            out.push_str("  (exists)");
        } else {
            out.push_str("  (not found)");
        }
    }

    out
}
