//! Signature viewer server binary

use anyhow::Result;
use clap::Parser;
use signature_viewer::{router, AppState, Config};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "signature-viewer")]
#[command(version, about = "Draw a signature and view it stamped onto a PDF")]
struct Args {
    /// Address to bind
    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 3001)]
    port: u16,

    /// Directory the source document is read from
    #[arg(long, env = "DOCUMENT_ROOT", default_value = ".")]
    document_root: PathBuf,

    /// Source document path, relative to the document root
    #[arg(long, env = "SOURCE_DOCUMENT", default_value = "cover-letter.pdf")]
    source_document: String,

    /// Signature canvas width in pixels
    #[arg(long, env = "CANVAS_WIDTH", default_value_t = 400)]
    canvas_width: u32,

    /// Signature canvas height in pixels
    #[arg(long, env = "CANVAS_HEIGHT", default_value_t = 200)]
    canvas_height: u32,

    /// Pen width in pixels
    #[arg(long, env = "PEN_WIDTH", default_value_t = 2.5)]
    pen_width: f32,
}

impl From<Args> for Config {
    fn from(args: Args) -> Self {
        Self {
            document_root: args.document_root,
            source_document: args.source_document,
            canvas_width: args.canvas_width,
            canvas_height: args.canvas_height,
            pen_width: args.pen_width,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("signature_viewer=info".parse()?)
                .add_directive("signature_core=info".parse()?)
                .add_directive("tower_http=debug".parse()?),
        )
        .init();

    let args = Args::parse();
    let addr = SocketAddr::new(args.bind, args.port);

    info!("Initializing signature viewer...");
    let state = Arc::new(AppState::new(&Config::from(args)));
    let app = router(state);

    info!("Starting signature viewer on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
