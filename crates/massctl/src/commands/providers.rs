//! Provider command handlers.

use std::sync::Arc;

use tabled::Tabled;

use massctl_core::{MassClient, ProviderInstance};

use crate::cli::{GlobalOpts, ProvidersArgs, ProvidersCommand};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ProviderRow {
    #[tabled(rename = "Instance")]
    instance_id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Domain")]
    domain: String,
    #[tabled(rename = "Type")]
    provider_type: String,
    #[tabled(rename = "Available")]
    available: String,
}

pub fn handle(
    client: &MassClient,
    args: ProvidersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ProvidersCommand::List => {
            let color = output::should_color(&global.color);
            let mut snap: Vec<Arc<ProviderInstance>> =
                client.providers_snapshot().iter().cloned().collect();
            snap.sort_by(|a, b| a.instance_id.cmp(&b.instance_id));
            let out = output::render_list(
                &global.output,
                &snap,
                |p| ProviderRow {
                    instance_id: p.instance_id.clone(),
                    name: client.provider_name(&p.instance_id),
                    domain: p.domain.clone(),
                    provider_type: p.provider_type.to_string(),
                    available: output::paint_flag(p.available, color),
                },
                |p| p.instance_id.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
