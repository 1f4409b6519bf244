//! Background thread running the workflows; the viewport stays on the UI thread.

use anyhow::{anyhow, Context, Result};
use eframe::egui;
use h5stl_client::{read_local_file, Action, ClientConfig, ConversionClient, Workflows};
use h5stl_core::input::LocalFile;
use h5stl_core::mesh::{MeshBuilder, MeshConfig};
use h5stl_core::scene::{PreparedModel, Ticket};
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::mpsc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio::task::LocalSet;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settings {
    pub deflection: f64,
    pub edge_threshold_deg: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            deflection: ClientConfig::default().deflection,
            edge_threshold_deg: MeshConfig::default().edge_threshold_deg,
        }
    }
}

#[derive(Debug)]
pub enum Source {
    Path(PathBuf),
    Loaded(LocalFile),
}

impl Source {
    fn label(&self) -> String {
        match self {
            Source::Path(p) => p.display().to_string(),
            Source::Loaded(f) => f.name.clone(),
        }
    }

    async fn read(self) -> Result<LocalFile> {
        match self {
            Source::Path(p) => Ok(read_local_file(&p).await?),
            Source::Loaded(f) => Ok(f),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowKind {
    Stl,
    H5,
    /// Decided by the file type.
    Dropped,
}

#[derive(Debug)]
pub enum Job {
    Show {
        source: Source,
        kind: ShowKind,
        ticket: Ticket,
    },
    Convert {
        source: Source,
    },
    Save {
        url: String,
        dest: PathBuf,
    },
}

#[derive(Debug)]
pub enum Done {
    Shown(PreparedModel),
    DownloadReady { source: String, url: String },
    Saved { path: PathBuf, bytes: u64 },
    Failed { what: String, error: String },
}

enum Message {
    Configure(Settings),
    Run(Job),
}

pub struct Worker {
    jobs: UnboundedSender<Message>,
    done: mpsc::Receiver<Done>,
}

impl Worker {
    pub fn spawn(ctx: egui::Context, settings: Settings) -> Result<Self> {
        let (job_tx, mut job_rx) = unbounded_channel::<Message>();
        let (done_tx, done_rx) = mpsc::channel();
        let initial = workflows(settings)?;
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("start async runtime")?;

        std::thread::Builder::new()
            .name("h5stl-worker".to_string())
            .spawn(move || {
                let local = LocalSet::new();
                local.block_on(&rt, async move {
                    let mut current = Rc::new(initial);
                    while let Some(message) = job_rx.recv().await {
                        let job = match message {
                            Message::Run(job) => job,
                            Message::Configure(settings) => {
                                match workflows(settings) {
                                    Ok(wf) => current = Rc::new(wf),
                                    Err(e) => warn!(error = %e, "keeping previous settings"),
                                }
                                continue;
                            }
                        };
                        let wf = Rc::clone(&current);
                        let done = done_tx.clone();
                        let ctx = ctx.clone();
                        tokio::task::spawn_local(async move {
                            // The receiver only goes away when the window closes.
                            let _ = done.send(run(&wf, job).await);
                            ctx.request_repaint();
                        });
                    }
                });
            })
            .context("spawn worker thread")?;

        Ok(Self {
            jobs: job_tx,
            done: done_rx,
        })
    }

    pub fn send(&self, job: Job) {
        self.post(Message::Run(job));
    }

    /// Applies to jobs sent after this call.
    pub fn configure(&self, settings: Settings) {
        self.post(Message::Configure(settings));
    }

    fn post(&self, message: Message) {
        if self.jobs.send(message).is_err() {
            warn!("worker thread is gone");
        }
    }

    pub fn try_recv(&self) -> Option<Done> {
        self.done.try_recv().ok()
    }
}

fn workflows(settings: Settings) -> Result<Workflows> {
    let cfg = ClientConfig {
        deflection: settings.deflection,
        ..ClientConfig::default()
    };
    let mesh = MeshConfig {
        edge_threshold_deg: settings.edge_threshold_deg,
        ..MeshConfig::default()
    };
    let client = ConversionClient::new(cfg).context("create http client")?;
    Ok(Workflows::new(client, MeshBuilder::new(mesh)))
}

async fn run(wf: &Workflows, job: Job) -> Done {
    match job {
        Job::Show {
            source,
            kind,
            ticket,
        } => {
            let label = source.label();
            match show(wf, source, kind, ticket).await {
                Ok(prepared) => Done::Shown(prepared),
                Err(e) => failed(&label, e),
            }
        }
        Job::Convert { source } => {
            let label = source.label();
            let result = async {
                let file = source.read().await?;
                Ok::<_, anyhow::Error>(wf.h5_to_stl(file).await?)
            }
            .await;
            match result {
                Ok(url) => Done::DownloadReady { source: label, url },
                Err(e) => failed(&label, e),
            }
        }
        Job::Save { url, dest } => match wf.client().save_artifact(&url, &dest).await {
            Ok(bytes) => {
                info!(path = %dest.display(), bytes, "artifact saved");
                Done::Saved { path: dest, bytes }
            }
            Err(e) => failed(&url, e.into()),
        },
    }
}

async fn show(
    wf: &Workflows,
    source: Source,
    kind: ShowKind,
    ticket: Ticket,
) -> Result<PreparedModel> {
    let file = source.read().await?;
    let name = file.name.clone();
    let action = match kind {
        ShowKind::Stl => Some(Action::UploadStl(file)),
        ShowKind::H5 => Some(Action::VisualizeH5(file)),
        ShowKind::Dropped => Action::for_dropped(file),
    };
    match action {
        Some(Action::UploadStl(file)) => Ok(wf.stl_to_vis(&file, ticket)?),
        Some(Action::VisualizeH5(file)) => Ok(wf.h5_to_vis(file, ticket).await?.0),
        _ => Err(anyhow!("{name}: drop an .stl or .h5 file")),
    }
}

fn failed(what: &str, error: anyhow::Error) -> Done {
    let error = format!("{error:#}");
    warn!(what, %error, "workflow failed");
    Done::Failed {
        what: what.to_string(),
        error,
    }
}
