//! Live event stream.

use owo_colors::OwoColorize;
use tokio::sync::mpsc;

use massctl_core::{ANY_OBJECT, Event, EventType, MassClient};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

fn format_event(event: &Event, format: &OutputFormat, color: bool) -> String {
    match format {
        OutputFormat::Json | OutputFormat::JsonCompact => output::render_json_compact(event),
        OutputFormat::Yaml => format!("---\n{}", output::render_yaml(event).trim_end()),
        OutputFormat::Plain => format!("{} {}", event.event, event.object_id),
        OutputFormat::Table => {
            let data = output::render_json_compact(&event.data);
            if color {
                format!(
                    "{} {} {}",
                    event.event.cyan(),
                    event.object_id.bold(),
                    data.dimmed()
                )
            } else {
                format!("{} {} {data}", event.event, event.object_id)
            }
        }
    }
}

pub async fn handle(client: &MassClient, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let filters: Vec<EventType> = if args.event.is_empty() {
        vec![EventType::All]
    } else {
        args.event.iter().map(|e| EventType::from(e.as_str())).collect()
    };
    let object_id = args.object.as_deref().unwrap_or(ANY_OBJECT);

    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let subscription = client.subscribe_multi(filters, object_id, move |event| {
        let _ = tx.send(event.clone());
    });
    tracing::info!(object_id, "watching events, press Ctrl-C to stop");

    let color = output::should_color(&global.color);
    let mut failure = client.failure();
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);
    loop {
        tokio::select! {
            _ = &mut interrupt => break,
            Some(event) = rx.recv() => {
                output::print_output(&format_event(&event, &global.output, color), global.quiet);
            }
            changed = failure.changed() => {
                if changed.is_err() {
                    break;
                }
                if *failure.borrow_and_update() {
                    subscription.unsubscribe();
                    return Err(CliError::ConnectionLost);
                }
            }
        }
    }

    subscription.unsubscribe();
    Ok(())
}
