use std::path::Path;
use std::process;

use crate::commands::evaluate_or_exit;
use crate::{report_error, OutputFormat, ValueFormat};

pub(crate) fn cmd_eval(
    file: &Path,
    format: ValueFormat,
    select: Option<&str>,
    output: OutputFormat,
    quiet: bool,
) {
    let value = evaluate_or_exit(file, output, quiet);

    let value = match select {
        None => value,
        Some(path) => match value.get_path(path) {
            Some(selected) => selected.clone(),
            None => {
                report_error(&format!("no value at key path '{}'", path), output, quiet);
                process::exit(1);
            }
        },
    };

    let rendered = match format {
        ValueFormat::Json => serde_json::to_string_pretty(&value.to_json())
            .map_err(|e| format!("serialization error: {}", e)),
        // TOML has no null and needs a table at the root
        ValueFormat::Toml => {
            toml::to_string_pretty(&value).map_err(|e| format!("cannot render as TOML: {}", e))
        }
    };

    match rendered {
        Ok(text) => println!("{}", text.trim_end()),
        Err(msg) => {
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}
