use std::fmt::Write as _;
use std::fs::File;
use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use placement_config::{
    read_resource, resource_to_yaml, write_resource, OperatorConfig, PlacementApiManifest,
};
use placement_diff::{Changes, Diff};
use placement_types::placement::{Endpoint, HashTag, PlacementApi};
use placement_types::registry::SchemeRegistry;

/// Inspect PlacementAPI manifests and stored resources
#[derive(Parser, Debug)]
#[command(name = "placement-ctl", version)]
struct Cli {
    /// operator config with the defaults for absent spec fields,
    /// falls back to PLACEMENT_CONFIG and then $HOME/.placement/config.yaml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// default and validate a manifest, print the resulting resource
    Validate { manifest: PathBuf },
    /// print the readiness columns of stored resources
    Status {
        #[arg(required = true)]
        resources: Vec<PathBuf>,
    },
    /// print the url published for an endpoint class
    Endpoint { resource: PathBuf, class: String },
    /// compare a rendered object against the hash recorded under a tag
    Hash {
        resource: PathBuf,
        tag: String,
        rendered: PathBuf,
        /// write the new hash back into the resource file
        #[arg(long)]
        record: bool,
    },
}

fn main() {
    fluvio_future::subscriber::init_tracer(None);
    if let Err(e) = run(Cli::parse()) {
        eprintln!("{e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Validate { manifest } => {
            let config = OperatorConfig::load(cli.config.as_deref())?;
            let registry = SchemeRegistry::bootstrap();
            let resource = PlacementApiManifest::from_file(&manifest)?
                .into_resource(&registry, &config.defaults)?;
            print!("{}", resource_to_yaml(&resource)?);
        }
        Command::Status { resources } => {
            let resources = resources
                .iter()
                .map(read_resource)
                .collect::<Result<Vec<_>, _>>()?;
            print!("{}", render_status(&resources));
        }
        Command::Endpoint { resource, class } => {
            let resource = read_resource(resource)?;
            let url = resource.get_endpoint(&Endpoint::from(class.as_str()))?;
            println!("{url}");
        }
        Command::Hash {
            resource: path,
            tag,
            rendered,
            record,
        } => {
            let mut resource = read_resource(&path)?;
            if record {
                resource.spec.validate()?;
            }
            let tag = HashTag::from(tag);
            let rendered: serde_json::Value = serde_yaml::from_reader(File::open(rendered)?)?;
            let diff = rendered.diff(&resource.status, &tag)?;
            println!("{}", describe_diff(&diff));
            if record && diff.apply(&mut resource.status, &tag) {
                debug!(path = %path.display(), %tag, "recording hash");
                write_resource(&path, &resource)?;
            }
        }
    }
    Ok(())
}

fn describe_diff(diff: &Diff) -> String {
    match diff {
        Diff::None => "unchanged".to_owned(),
        Diff::New(current) => format!("new {current}"),
        Diff::Changed { previous, current } => format!("changed {previous} -> {current}"),
    }
}

const STATUS_HEADER: [&str; 5] = ["NAME", "NETWORKATTACHMENTS", "STATUS", "MESSAGE", "READY"];

fn render_status(resources: &[PlacementApi]) -> String {
    let rows: Vec<[String; 5]> = resources
        .iter()
        .map(|resource| {
            let columns = resource.print_columns();
            [
                resource.metadata.name.clone(),
                columns.network_attachments,
                columns.status,
                columns.message,
                resource.is_ready().to_string(),
            ]
        })
        .collect();

    let mut widths = STATUS_HEADER.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    let header = STATUS_HEADER.map(str::to_owned);
    for row in std::iter::once(&header).chain(rows.iter()) {
        let mut line = String::new();
        for (cell, width) in row.iter().zip(widths) {
            let _ = write!(line, "{cell:<width$}   ");
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}
