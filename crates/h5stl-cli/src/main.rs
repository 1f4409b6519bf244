use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use h5stl_client::{read_local_file, Action, ClientConfig, ConversionClient, Outcome, Workflows};
use h5stl_core::input::LocalFile;
use h5stl_core::mesh::{MeshBuilder, MeshConfig};
use h5stl_core::report::ModelReport;
use h5stl_core::scene::{MemoryScene, Viewport};
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Debug, Parser)]
#[command(name = "h5stl")]
#[command(about = "Convert h5 models to STL and inspect the resulting meshes.")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Debug, Args)]
struct CommonArgs {
    /// Conversion backend base URL.
    #[arg(long, global = true)]
    backend: Option<String>,
    #[arg(long, global = true, default_value_t = 0.1)]
    deflection: f64,
    /// Feature-edge angle in degrees.
    #[arg(long, global = true, default_value_t = 1.0)]
    edge_threshold: f32,
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a local STL file and print its report.
    Inspect {
        input: PathBuf,
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Convert an h5 file and print the artifact URL.
    Convert {
        input: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Convert an h5 file, fetch the STL and print its report.
    Visualize {
        input: PathBuf,
        #[arg(long)]
        save_stl: Option<PathBuf>,
        #[arg(long)]
        report: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.common.verbose);

    let workflows = workflows(&cli.common)?;
    let mut viewport = Viewport::new(MemoryScene::new());

    match cli.cmd {
        Command::Inspect { input, report } => {
            let file = load(&input).await?;
            let outcome = workflows.run(&mut viewport, Action::UploadStl(file)).await;
            let outcome = outcome.with_context(|| format!("inspect {input:?}"))?;
            emit_report(outcome, report.as_deref()).await
        }
        Command::Convert { input, out } => {
            let file = load(&input).await?;
            let url = workflows
                .h5_to_stl(file)
                .await
                .with_context(|| format!("convert {input:?}"))?;
            println!("{url}");
            if let Some(path) = out {
                create_parent(&path).await;
                let written = workflows
                    .client()
                    .save_artifact(&url, &path)
                    .await
                    .with_context(|| format!("save {url} to {path:?}"))?;
                eprintln!("wrote {written} bytes to {}", path.display());
            }
            Ok(())
        }
        Command::Visualize {
            input,
            save_stl,
            report,
        } => {
            let file = load(&input).await?;
            let outcome = workflows
                .run(&mut viewport, Action::VisualizeH5(file))
                .await
                .with_context(|| format!("visualize {input:?}"))?;
            if let Some(path) = save_stl {
                save_artifact(&outcome, &path).await?;
            }
            emit_report(outcome, report.as_deref()).await
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn workflows(common: &CommonArgs) -> Result<Workflows> {
    if common.deflection.is_nan() || common.deflection <= 0.0 {
        bail!("deflection must be positive, got {}", common.deflection);
    }
    let mut cfg = ClientConfig {
        deflection: common.deflection,
        ..ClientConfig::default()
    };
    if let Some(backend) = &common.backend {
        cfg.base_url = backend.clone();
    }

    let mesh_cfg = MeshConfig {
        edge_threshold_deg: common.edge_threshold,
        ..MeshConfig::default()
    };
    let client = ConversionClient::new(cfg).context("create http client")?;
    Ok(Workflows::new(client, MeshBuilder::new(mesh_cfg)))
}

async fn load(input: &Path) -> Result<LocalFile> {
    ensure_input_file(input).await?;
    Ok(read_local_file(input).await?)
}

async fn save_artifact(outcome: &Outcome, path: &Path) -> Result<()> {
    let Outcome::Displayed {
        artifact: Some(artifact),
        ..
    } = outcome
    else {
        bail!("no converted STL to save");
    };
    create_parent(path).await;
    tokio::fs::write(path, &artifact.bytes)
        .await
        .with_context(|| format!("write stl: {path:?}"))?;
    eprintln!("saved {} to {}", artifact.url, path.display());
    Ok(())
}

async fn emit_report(outcome: Outcome, path: Option<&Path>) -> Result<()> {
    let report: ModelReport = match outcome {
        Outcome::Displayed { report, .. } => report,
        Outcome::DownloadReady { url } => bail!("expected a displayed model, got download {url}"),
    };
    let json = serde_json::to_string_pretty(&report).context("serialize report")?;

    if let Some(path) = path {
        create_parent(path).await;
        tokio::fs::write(path, &json)
            .await
            .with_context(|| format!("write report: {path:?}"))?;
    } else {
        println!("{json}");
    }
    Ok(())
}

async fn create_parent(path: &Path) {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }
}

async fn ensure_input_file(input: &Path) -> Result<()> {
    match tokio::fs::metadata(input).await {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => bail!("input is not a file: {input:?}"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
            bail!("input not found: {input:?} (cwd: {cwd:?}).");
        }
        Err(err) => Err(err).with_context(|| format!("stat input: {input:?}")),
    }
}
