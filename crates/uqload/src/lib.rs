//! Resolve Uqload video pages into direct media URLs and download them.
//!
//! ```rust,no_run
//! use uqload_dl::{Resolver, CancellationToken};
//!
//! # async fn run() -> uqload_dl::Result<()> {
//! let resolver = Resolver::builder("https://uqload.io/vule3vel9n5q.html")
//!     .output_dir("/tmp")
//!     .build()?;
//! let metadata = resolver.metadata().await?;
//! println!("{} ({} bytes)", metadata.title, metadata.size_bytes);
//!
//! let outcome = resolver.download(&CancellationToken::new()).await?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod downloader;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod media;
pub mod progress;
pub mod resolver;
pub mod sanitize;
pub mod token;

pub use config::{ClientConfig, HostConfig, ResolverConfig};
pub use downloader::{DownloadOutcome, FileDownloader, ProgressCallback};
pub use error::{Result, UqloadError};
pub use fetcher::ConcurrentFetcher;
pub use media::VideoMetadata;
pub use resolver::{Resolver, VideoReference};
pub use token::{SharedTokenSource, TokenSource, UuidTokens};
pub use tokio_util::sync::CancellationToken;
