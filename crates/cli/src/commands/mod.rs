mod check;
mod eval;

use std::io::Read;
use std::path::Path;
use std::process;

use sheaf_core::{Error, Options, Value};

use crate::OutputFormat;

pub(crate) use check::cmd_check;
pub(crate) use eval::cmd_eval;

/// Read the file (or stdin for `-`) and evaluate it. On failure the
/// diagnostic is printed and the process exits with status 1.
pub(crate) fn evaluate_or_exit(file: &Path, output: OutputFormat, quiet: bool) -> Value {
    let result = if file == Path::new("-") {
        let mut src = String::new();
        std::io::stdin()
            .read_to_string(&mut src)
            .map_err(Error::from)
            .and_then(|_| sheaf_core::evaluate_str(&src))
    } else {
        sheaf_core::evaluate_file(file, &Options::default())
    };

    match result {
        Ok(value) => value,
        Err(e) => {
            report_pipeline_error(file, &e, output, quiet);
            process::exit(1);
        }
    }
}

fn report_pipeline_error(file: &Path, err: &Error, output: OutputFormat, quiet: bool) {
    let name = display_name(file);
    match output {
        OutputFormat::Json => {
            let mut json = err.to_json_value();
            json["file"] = serde_json::Value::String(name);
            let text = serde_json::to_string_pretty(&json)
                .unwrap_or_else(|_| format!("{{\"error\": \"{:?}\"}}", err));
            eprintln!("{}", text);
        }
        OutputFormat::Text => {
            if !quiet {
                match err.span() {
                    Some(span) => eprintln!(
                        "{}:{}: {} error: {}",
                        name,
                        span,
                        err.stage(),
                        err.message()
                    ),
                    None => eprintln!("{}: {} error: {}", name, err.stage(), err.message()),
                }
            }
        }
    }
}

pub(crate) fn display_name(file: &Path) -> String {
    if file == Path::new("-") {
        "<stdin>".to_owned()
    } else {
        file.display().to_string()
    }
}
