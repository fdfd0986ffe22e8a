//! Raw command passthrough.

use serde_json::Value;

use massctl_core::{Args, MassClient};

use crate::cli::{GlobalOpts, SendArgs};
use crate::error::CliError;
use crate::output;

/// Parse `--args` into an argument map. Absent means no arguments.
pub fn parse_args(raw: Option<&str>) -> Result<Args, CliError> {
    let Some(raw) = raw else {
        return Ok(Args::new());
    };
    match serde_json::from_str::<Value>(raw)? {
        Value::Object(map) => Ok(Args::from(map)),
        other => Err(CliError::Validation {
            field: "args".into(),
            reason: format!("expected a JSON object, got {other}"),
        }),
    }
}

pub async fn handle(client: &MassClient, args: SendArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let command_args = parse_args(args.args.as_deref())?;

    if args.no_wait {
        client.fire_command(&args.command, command_args)?;
        if !global.quiet {
            eprintln!("Sent {}", args.command);
        }
        return Ok(());
    }

    let result = client.send_command_raw(&args.command, command_args).await?;
    let out = output::render_single(
        &global.output,
        &result,
        output::render_json_pretty::<Value>,
        |v| match v {
            Value::String(s) => s.clone(),
            other => output::render_json_compact(other),
        },
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
