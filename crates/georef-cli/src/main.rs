use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use env_logger::Env;
use georef_annotation::ImageServiceInfo;
use georef_pipeline::{
    EditorSnapshot, GeorefConfig, GeorefSession, NativeSizeProvider, NoFallback, ProjectProblem,
    ResourceSources, SingleSaveProblem, run_save, run_save_item,
};
use log::info;

/// Turn georeferencing editor snapshots into annotation JSON.
#[derive(Debug, Parser)]
#[command(author, version, about = "Georeference annotation builder")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Build one annotation from one editor snapshot.
    Annotate {
        /// Path to a JSON EditorSnapshot.
        #[arg(long)]
        input: String,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Build an AnnotationPage from several snapshots, in order.
    Project {
        /// Paths to JSON EditorSnapshots.
        #[arg(long = "input", required = true)]
        inputs: Vec<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
    /// Print the preview image URL the editor should load for a resource.
    Preview {
        /// Path to JSON ResourceSources.
        #[arg(long)]
        input: String,

        /// Optional path to JSON GeorefConfig; only `previewMax` is used.
        #[arg(long)]
        config: Option<String>,

        #[arg(long)]
        output: Option<String>,
    },
}

#[derive(Debug, clap::Args)]
struct CommonArgs {
    /// Optional path to JSON GeorefConfig. Defaults are used if omitted.
    #[arg(long)]
    config: Option<String>,

    /// Local copy of the image service's info.json, used when a snapshot
    /// does not carry the native size.
    #[arg(long)]
    service_info: Option<String>,

    /// Write the result here instead of stdout.
    #[arg(long)]
    output: Option<String>,
}

fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let data =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("failed to parse {}", path.display()))
}

fn load_config(config_path: Option<&str>) -> Result<GeorefConfig> {
    match config_path {
        Some(path) => load_json_file(Path::new(path)),
        None => Ok(GeorefConfig::default()),
    }
}

/// Serves one service description from disk, whatever base is asked for.
struct ServiceInfoFile(ImageServiceInfo);

impl NativeSizeProvider for ServiceInfoFile {
    fn image_service_info(&self, base: &str) -> Result<ImageServiceInfo> {
        info!("using local service description for {base}");
        Ok(self.0.clone())
    }
}

fn load_provider(service_info: Option<&str>) -> Result<Box<dyn NativeSizeProvider>> {
    Ok(match service_info {
        Some(path) => Box::new(ServiceInfoFile(load_json_file(Path::new(path))?)),
        None => Box::new(NoFallback),
    })
}

fn run_annotate_from_files(
    input_path: &str,
    config_path: Option<&str>,
    service_info: Option<&str>,
) -> Result<String> {
    let snapshot: EditorSnapshot = load_json_file(Path::new(input_path))?;
    let provider = load_provider(service_info)?;

    let mut session = GeorefSession::<SingleSaveProblem>::new();
    session.set_config(load_config(config_path)?)?;
    session.set_input(snapshot)?;
    run_save(&mut session, provider.as_ref())?;

    let output = session.require_output()?;
    info!("{}", output.registration.summary());
    Ok(serde_json::to_string_pretty(&session.export()?)?)
}

fn run_project_from_files(
    input_paths: &[String],
    config_path: Option<&str>,
    service_info: Option<&str>,
) -> Result<String> {
    let provider = load_provider(service_info)?;

    let mut session = GeorefSession::<ProjectProblem>::new();
    session.set_config(load_config(config_path)?)?;
    for path in input_paths {
        let snapshot: EditorSnapshot = load_json_file(Path::new(path))?;
        session.set_input(snapshot)?;
        let id = run_save_item(&mut session, provider.as_ref())
            .with_context(|| format!("failed to save {path}"))?;
        info!("saved {id}");
    }
    Ok(serde_json::to_string_pretty(&session.export()?)?)
}

fn run_preview_from_files(input_path: &str, config_path: Option<&str>) -> Result<String> {
    let sources: ResourceSources = load_json_file(Path::new(input_path))?;
    let config = load_config(config_path)?;
    config.validate()?;
    sources
        .preview_url(config.preview_max)
        .ok_or_else(|| anyhow!("{input_path} has no image service to preview"))
}

fn write_output(text: &str, output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, text).with_context(|| format!("failed to write {path}")),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    match &args.command {
        Command::Annotate { input, common } => {
            let json = run_annotate_from_files(
                input,
                common.config.as_deref(),
                common.service_info.as_deref(),
            )?;
            write_output(&json, common.output.as_deref())
        }
        Command::Project { inputs, common } => {
            let json = run_project_from_files(
                inputs,
                common.config.as_deref(),
                common.service_info.as_deref(),
            )?;
            write_output(&json, common.output.as_deref())
        }
        Command::Preview {
            input,
            config,
            output,
        } => {
            let url = run_preview_from_files(input, config.as_deref())?;
            write_output(&url, output.as_deref())
        }
    }
}
