use std::path::PathBuf;

use clap::Parser;
use tower_lsp::{LspService, Server};
use tracing::info;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use jsonnet_analyzer::JsonnetLanguageServer;

#[derive(Parser, Debug)]
#[command(name = "jsonnet-analyzer", version, about)]
struct Args {
    #[arg(long, short)]
    verbose: bool,

    #[arg(long)]
    log_file: Option<String>,

    /// Additional library search directory, tried after configured jpaths.
    #[arg(long = "jpath", short = 'J')]
    jpaths: Vec<PathBuf>,
}

fn default_log_path() -> PathBuf {
    let dir = dirs_or_tmp();
    dir.join("jsonnet-analyzer.log")
}

fn dirs_or_tmp() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        let dir = PathBuf::from(home).join(".jsonnet-analyzer");
        if std::fs::create_dir_all(&dir).is_ok() {
            return dir;
        }
    }
    std::env::temp_dir()
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let stderr_filter = if args.verbose {
        EnvFilter::new("jsonnet_analyzer=debug,tower_lsp=debug")
    } else {
        EnvFilter::new("jsonnet_analyzer=info,tower_lsp=warn")
    };

    let file_filter = if args.verbose {
        EnvFilter::new("jsonnet_analyzer=debug,tower_lsp=info")
    } else {
        EnvFilter::new("jsonnet_analyzer=info,tower_lsp=warn")
    };

    let log_path = args.log_file.as_ref().map(PathBuf::from).unwrap_or_else(default_log_path);

    let file_appender = tracing_appender::rolling::never(
        log_path.parent().unwrap_or(std::path::Path::new(".")),
        log_path.file_name().unwrap_or(std::ffi::OsStr::new("jsonnet-analyzer.log")),
    );

    let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false).with_target(false).with_filter(file_filter);

    let stderr_layer =
        fmt::layer().with_writer(std::io::stderr).with_ansi(false).with_target(false).with_filter(stderr_filter);

    tracing_subscriber::registry().with(file_layer).with(stderr_layer).init();

    info!("Starting jsonnet-analyzer v{}", env!("CARGO_PKG_VERSION"));
    info!("Log file: {}", log_path.display());

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(|client| JsonnetLanguageServer::new(client, args.jpaths));

    Server::new(stdin, stdout, socket).serve(service).await;

    info!("jsonnet-analyzer stopped");
}
