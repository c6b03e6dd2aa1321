//! Fetches a `gopher://` URI and prints it.
//!
//! ```text
//! gopher [--json] [uri]
//! ```

use anyhow::bail;
use burrow::client::{self, ResponseBody};
use tokio::io::AsyncWriteExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_URI: &str = "gopher://gopher.floodgap.com/";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let mut json = false;
    let mut uri = None;

    for arg in std::env::args().skip(1) {
        if arg == "--json" {
            json = true;
        } else if arg.starts_with("--") {
            bail!("unknown flag {arg}");
        } else if uri.is_some() {
            bail!("usage: gopher [--json] [uri]");
        } else {
            uri = Some(arg);
        }
    }

    let uri = uri.unwrap_or_else(|| DEFAULT_URI.to_string());
    let res = client::get(&uri).await?;

    let out = match res.body {
        ResponseBody::Directory(dir) if json => dir.to_json()?,
        ResponseBody::Directory(dir) => dir.to_text(),
        ResponseBody::Document(doc) => doc.bytes().await?,
    };

    let mut stdout = tokio::io::stdout();
    stdout.write_all(&out).await?;
    stdout.flush().await?;

    Ok(())
}
