//! Gopher client.
//!
//! ```no_run
//! # async fn run() -> burrow::Result<()> {
//! let res = burrow::client::get("gopher://gopher.floodgap.com/").await?;
//! if let Some(dir) = res.directory() {
//!     print!("{}", String::from_utf8_lossy(&dir.to_text()));
//! }
//! # Ok(())
//! # }
//! ```

pub mod fetch;
pub mod response;

pub use fetch::{Client, fetch_directory, fetch_file, get, item_for_uri};
pub use response::{Document, Response, ResponseBody};
