//! # Tapelabel CLI
//!
//! Command-line interface for label previews, printing and the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! # Run the label editor server
//! tapelabel serve --listen 0.0.0.0:5000
//!
//! # Render a label to PNG
//! tapelabel preview label.json -o label.png
//!
//! # Print one label on the first available printer
//! tapelabel print label.json
//!
//! # Print a batch: every row, three copies each, one second apart
//! tapelabel batch label.json --rows rows.json --copies 3 --pause 1
//!
//! # List configured printers
//! tapelabel printers
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tapelabel::{
    Label, LabelError,
    batch::{BatchController, BatchRequest},
    config::{self, DEFAULT_CLIENT_DIR, DEFAULT_LISTEN, ENV_CLIENT_DIR, ENV_LISTEN, ENV_PRINT_COMMAND,
        ENV_UPLOAD_DIR, ENV_VIRTUAL_PRINTERS},
    label::BatchRow,
    printer::PrinterRegistry,
    render::{ComposeMode, WidgetRenderers},
    server::{self, ServerConfig},
    uploads::DirImageStore,
};

/// Tapelabel - Tape label layout and printing
#[derive(Parser, Debug)]
#[command(name = "tapelabel")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Printer and upload settings shared by every command.
#[derive(Args, Debug)]
struct PrinterArgs {
    /// JSON array of virtual printers: [{"name", "path", "output"?}]
    #[arg(long, env = ENV_VIRTUAL_PRINTERS, default_value = "")]
    virtual_printers: String,

    /// Program that prints a PNG passed as its last argument
    #[arg(long, env = ENV_PRINT_COMMAND)]
    print_command: Option<String>,

    /// Directory holding uploaded images
    #[arg(long, env = ENV_UPLOAD_DIR)]
    upload_dir: Option<PathBuf>,
}

impl PrinterArgs {
    fn upload_dir(&self) -> PathBuf {
        self.upload_dir.clone().unwrap_or_else(config::default_upload_dir)
    }

    fn registry(&self) -> Result<PrinterRegistry, LabelError> {
        let virtual_printers = config::parse_virtual_printers(&self.virtual_printers);
        PrinterRegistry::from_config(&virtual_printers, self.print_command.as_deref())
    }

    fn renderers(&self) -> Result<WidgetRenderers, LabelError> {
        Ok(WidgetRenderers::new(Arc::new(DirImageStore::open(self.upload_dir())?)))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, env = ENV_LISTEN, default_value = DEFAULT_LISTEN)]
        listen: String,

        /// Directory with the built label editor
        #[arg(long, env = ENV_CLIENT_DIR, default_value = DEFAULT_CLIENT_DIR)]
        client_dir: PathBuf,

        #[command(flatten)]
        printers: PrinterArgs,
    },

    /// Render a label to PNG
    Preview {
        /// Label file: {"widgets": [...], "settings": {...}}
        label: PathBuf,

        /// Output PNG file
        #[arg(short, long, default_value = "label.png")]
        output: PathBuf,

        #[command(flatten)]
        printers: PrinterArgs,
    },

    /// Print one label
    Print {
        /// Label file: {"widgets": [...], "settings": {...}}
        label: PathBuf,

        /// Printer id (defaults to the label's printer, then auto-select)
        #[arg(long)]
        printer: Option<String>,

        #[command(flatten)]
        printers: PrinterArgs,
    },

    /// Print a label once per data row; events are written as JSON lines
    Batch {
        /// Label file: {"widgets": [...], "settings": {...}}
        label: PathBuf,

        /// Rows file: a JSON array of {"variable": "value"} objects
        #[arg(long)]
        rows: PathBuf,

        /// Copies per row
        #[arg(long, default_value = "1")]
        copies: i64,

        /// Seconds to wait between prints
        #[arg(long, default_value = "0")]
        pause: f64,

        /// Printer id (defaults to the label's printer, then auto-select)
        #[arg(long)]
        printer: Option<String>,

        #[command(flatten)]
        printers: PrinterArgs,
    },

    /// List configured printers
    Printers {
        #[command(flatten)]
        printers: PrinterArgs,
    },
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tapelabel=info,tower_http=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), LabelError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            listen,
            client_dir,
            printers,
        } => {
            let config = ServerConfig {
                listen_addr: listen,
                upload_dir: printers.upload_dir(),
                client_dir,
                virtual_printers: config::parse_virtual_printers(&printers.virtual_printers),
                print_command: printers.print_command,
            };
            server::serve(config).await
        }

        Commands::Preview {
            label,
            output,
            printers,
        } => {
            let label = read_label(&label)?;
            let renderers = printers.renderers()?;
            let rendered = renderers.render_label(&label.widgets, &label.settings, ComposeMode::Preview)?;
            std::fs::write(&output, rendered.to_png()?)?;
            println!(
                "Saved {}x{} label to {}",
                rendered.layout.width,
                rendered.layout.height,
                output.display()
            );
            Ok(())
        }

        Commands::Print {
            label,
            printer,
            printers,
        } => {
            let label = read_label(&label)?;
            let registry = printers.registry()?;
            let sink = registry.resolve(printer.as_deref().or(label.settings.printer_id()))?;
            let controller = BatchController::new(printers.renderers()?);

            let printer_id = sink.info().id;
            controller.print_single(label.widgets, label.settings, sink).await?;
            println!("Printed on {printer_id}");
            Ok(())
        }

        Commands::Batch {
            label,
            rows,
            copies,
            pause,
            printer,
            printers,
        } => {
            let label = read_label(&label)?;
            let rows: Vec<BatchRow> = read_json(&rows)?;
            let registry = printers.registry()?;
            let sink = registry.resolve(printer.as_deref().or(label.settings.printer_id()))?;
            let controller = BatchController::new(printers.renderers()?);

            let request = BatchRequest {
                widgets: label.widgets,
                settings: label.settings,
                rows,
                copies,
                pause_time: pause,
            };
            run_batch(&controller, request, sink).await
        }

        Commands::Printers { printers } => {
            let registry = printers.registry()?;
            let list = registry.list();
            if list.is_empty() {
                println!("No printers configured");
            }
            for info in list {
                println!("{}\t{}\t{}", info.id, info.name, info.vendor_product_id);
            }
            Ok(())
        }
    }
}

/// Drive a batch to its terminal event, cancelling on Ctrl-C.
async fn run_batch(
    controller: &BatchController,
    request: BatchRequest,
    sink: Arc<dyn tapelabel::printer::PrintSink>,
) -> Result<(), LabelError> {
    let mut handle = controller.start(request, sink)?;
    let mut interrupted = false;

    loop {
        tokio::select! {
            event = handle.events.recv() => {
                let Some(event) = event else { break };
                let line = serde_json::to_string(&event)
                    .map_err(|e| LabelError::Config(format!("failed to encode event: {e}")))?;
                println!("{line}");
                if !event.is_terminal() {
                    continue;
                }
                return match event.into_error() {
                    Some(e) => Err(e),
                    None => Ok(()),
                };
            }
            _ = tokio::signal::ctrl_c(), if !interrupted => {
                interrupted = true;
                controller.cancel(&handle.job_id);
            }
        }
    }
    Ok(())
}

fn read_label(path: &Path) -> Result<Label, LabelError> {
    read_json(path)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LabelError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| LabelError::Config(format!("Invalid JSON in {}: {}", path.display(), e)))
}
