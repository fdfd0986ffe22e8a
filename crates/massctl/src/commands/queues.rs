//! Queue command handlers.

use std::sync::Arc;

use tabled::Tabled;

use massctl_core::{MassClient, PlayerQueue, QueueItem};

use crate::cli::{GlobalOpts, QueuesArgs, QueuesCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct QueueRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Items")]
    items: u64,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Shuffle")]
    shuffle: String,
    #[tabled(rename = "Repeat")]
    repeat: String,
}

fn item_name(item: Option<&QueueItem>) -> String {
    item.map_or_else(|| "-".into(), |i| i.name.clone())
}

impl QueueRow {
    fn new(q: &PlayerQueue, color: bool) -> Self {
        Self {
            id: q.queue_id.clone(),
            name: q.display_name.clone(),
            state: output::paint_state(Some(q.state), color),
            items: q.items,
            current: item_name(q.current_item.as_ref()),
            shuffle: if q.shuffle_enabled { "on" } else { "off" }.into(),
            repeat: q.repeat_mode.to_string(),
        }
    }
}

fn detail(q: &PlayerQueue) -> String {
    let position = q
        .current_index
        .map_or_else(|| "-".into(), |i| format!("{} of {}", i + 1, q.items));
    output::detail_lines(&[
        ("ID", q.queue_id.clone()),
        ("Name", q.display_name.clone()),
        ("Active", q.active.to_string()),
        ("State", q.state.to_string()),
        ("Position", position),
        ("Elapsed", format!("{:.0}s", q.elapsed_time)),
        ("Current", item_name(q.current_item.as_ref())),
        ("Next", item_name(q.next_item.as_ref())),
        ("Shuffle", q.shuffle_enabled.to_string()),
        ("Repeat", q.repeat_mode.to_string()),
        ("Don't stop", q.dont_stop_the_music_enabled.to_string()),
    ])
}

pub fn handle(client: &MassClient, args: QueuesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        QueuesCommand::List => {
            let color = output::should_color(&global.color);
            let snap: Vec<Arc<PlayerQueue>> = client.queues_snapshot().iter().cloned().collect();
            let out = output::render_list(
                &global.output,
                &snap,
                |q| QueueRow::new(q, color),
                |q| q.queue_id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        QueuesCommand::Get { queue } => {
            let q = client.queue(&queue).ok_or_else(|| CliError::NotFound {
                resource_type: "queue".into(),
                identifier: queue.clone(),
                list_command: "queues list".into(),
            })?;
            let out = output::render_single(&global.output, q.as_ref(), detail, |q| {
                q.queue_id.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
