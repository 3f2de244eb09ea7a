use std::path::Path;

use crate::commands::{display_name, evaluate_or_exit};
use crate::OutputFormat;

pub(crate) fn cmd_check(file: &Path, output: OutputFormat, quiet: bool) {
    let value = evaluate_or_exit(file, output, quiet);
    if quiet {
        return;
    }

    let top_level_keys = value.as_map().map_or(0, |m| m.len());
    match output {
        OutputFormat::Json => {
            let report = serde_json::json!({
                "file": display_name(file),
                "ok": true,
                "top_level_keys": top_level_keys,
                "kind": value.type_name(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&report)
                    .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e))
            );
        }
        OutputFormat::Text => {
            println!("ok: {}", display_name(file));
            println!("  root: {}, {} top-level keys", value.type_name(), top_level_keys);
        }
    }
}
