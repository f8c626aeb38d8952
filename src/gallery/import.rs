//! Drag-and-drop ingestion.
//!
//! Each dropped provider that can hand out a file URL gets its own task:
//! resolve the URL, read the file, decode it. Tasks run under a semaphore
//! so a large drop cannot flood the blocking pool. Decoded images are
//! appended by the gallery owner as tasks finish, never from the tasks
//! themselves.
//!
//! There is no timeout and no cancellation. A provider whose URL never
//! resolves keeps `handle_drop` pending.

use super::{GalleryImage, ImageGallery};
use crate::codec::{self, CodecError};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Uniform type identifier of a file URL reference.
pub const FILE_URL_TYPE: &str = "public.file-url";

/// An opaque handle to dropped content.
pub trait DropProvider: Send + 'static {
    /// Whether this provider can produce content of `type_identifier`.
    fn has_item_conforming_to(&self, type_identifier: &str) -> bool;

    /// Resolves the provider to a local file path.
    fn load_file_url(self) -> impl Future<Output = Result<PathBuf, ImportError>> + Send;
}

/// Provider backed by an in-memory payload, as delivered by most hosts.
///
/// For [`FILE_URL_TYPE`] the payload is the UTF-8 text of the URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemProvider {
    type_identifier: String,
    data: Vec<u8>,
}

impl ItemProvider {
    pub fn new(type_identifier: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            type_identifier: type_identifier.into(),
            data: data.into(),
        }
    }

    pub fn file_url(url: impl Into<String>) -> Self {
        Self::new(FILE_URL_TYPE, url.into().into_bytes())
    }

    pub fn file_path(path: &Path) -> Result<Self, ImportError> {
        Ok(Self::file_url(path_to_file_url(path)?))
    }
}

impl DropProvider for ItemProvider {
    fn has_item_conforming_to(&self, type_identifier: &str) -> bool {
        self.type_identifier == type_identifier
    }

    async fn load_file_url(self) -> Result<PathBuf, ImportError> {
        if self.type_identifier != FILE_URL_TYPE {
            return Err(ImportError::UnsupportedType(self.type_identifier));
        }
        let url = String::from_utf8(self.data)
            .map_err(|_| ImportError::InvalidUrl("payload is not UTF-8".to_string()))?;
        file_url_to_path(url.trim())
    }
}

/// Result for one scheduled provider.
#[derive(Debug)]
pub struct ItemOutcome {
    /// Position of the provider in the dropped batch.
    pub position: usize,
    /// The imported file, or why it was skipped.
    pub result: Result<PathBuf, ImportError>,
}

/// Aggregate result of one drop.
#[derive(Debug, Default)]
pub struct DropReport {
    /// At least one provider offered a file URL.
    pub accepted: bool,
    /// Providers that offered no file URL and were never scheduled.
    pub ignored: usize,
    /// One entry per scheduled provider, in drop order.
    pub outcomes: Vec<ItemOutcome>,
}

impl DropReport {
    pub fn imported(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.imported()
    }

    /// At least one image made it into the gallery.
    pub fn handled(&self) -> bool {
        self.imported() > 0
    }
}

impl ImageGallery {
    /// Imports every dropped provider that offers a file URL.
    ///
    /// Individual failures are recorded in the report and never abort the
    /// batch. Images are appended in completion order.
    pub async fn handle_drop<P: DropProvider>(&mut self, providers: Vec<P>) -> DropReport {
        let start = std::time::Instant::now();
        let permits = Arc::new(Semaphore::new(self.import_concurrency));
        let mut tasks = JoinSet::new();
        let mut report = DropReport::default();
        let mut scheduled = Vec::new();

        for (position, provider) in providers.into_iter().enumerate() {
            if !provider.has_item_conforming_to(FILE_URL_TYPE) {
                report.ignored += 1;
                continue;
            }

            report.accepted = true;
            scheduled.push(position);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let result = match permits.acquire_owned().await {
                    Ok(_permit) => import_one(provider).await,
                    Err(e) => Err(ImportError::Worker(e.to_string())),
                };
                (position, result)
            });
        }

        if !report.accepted {
            log::info!("[IMPORT] Drop offered no file URLs ({} ignored)", report.ignored);
            return report;
        }

        while let Some(joined) = tasks.join_next().await {
            let (position, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    log::error!("[IMPORT] Import task failed: {}", e);
                    continue;
                }
            };

            let result = match result {
                Ok(image) => {
                    let path = image.source().map(Path::to_path_buf).unwrap_or_default();
                    log::debug!("[IMPORT] Added {}", path.display());
                    self.images.push(image);
                    Ok(path)
                }
                Err(e) => {
                    log::warn!("[IMPORT] Skipped dropped item {}: {}", position, e);
                    Err(e)
                }
            };
            report.outcomes.push(ItemOutcome { position, result });
        }

        // Tasks that died without reporting still count as failures.
        for position in scheduled {
            if !report.outcomes.iter().any(|o| o.position == position) {
                report.outcomes.push(ItemOutcome {
                    position,
                    result: Err(ImportError::Worker("import task aborted".to_string())),
                });
            }
        }
        report.outcomes.sort_by_key(|o| o.position);

        let elapsed_ms = start.elapsed().as_millis();
        if report.handled() {
            log::info!(
                "[IMPORT] All images processed: {} imported, {} failed in {}ms",
                report.imported(),
                report.failed(),
                elapsed_ms
            );
        } else {
            log::warn!(
                "[IMPORT] Drop accepted but no image could be imported ({} failed in {}ms)",
                report.failed(),
                elapsed_ms
            );
        }

        report
    }
}

async fn import_one<P: DropProvider>(provider: P) -> Result<GalleryImage, ImportError> {
    let path = provider.load_file_url().await?;

    let bytes = tokio::fs::read(&path).await.map_err(|e| ImportError::Read {
        path: path.clone(),
        source: e,
    })?;

    let image = tokio::task::spawn_blocking(move || codec::decode_image(&bytes))
        .await
        .map_err(|e| ImportError::Worker(e.to_string()))?
        .map_err(|e| ImportError::Decode {
            path: path.clone(),
            source: e,
        })?;

    Ok(GalleryImage::from_file(image, path))
}

/// Converts a `file://` URL into a local path.
///
/// Accepts an empty or `localhost` host. Query and fragment are not part
/// of the path. Percent-escapes are decoded to raw bytes, so names that are
/// not valid UTF-8 survive on Unix.
pub fn file_url_to_path(raw: &str) -> Result<PathBuf, ImportError> {
    let url = Url::parse(raw).map_err(|e| ImportError::InvalidUrl(format!("{}: {}", raw, e)))?;
    if url.scheme() != "file" {
        return Err(ImportError::NotAFileUrl(raw.to_string()));
    }

    url.to_file_path()
        .map_err(|_| ImportError::NotAFileUrl(raw.to_string()))
}

/// Builds a `file://` URL for an absolute path.
pub fn path_to_file_url(path: &Path) -> Result<Url, ImportError> {
    Url::from_file_path(path).map_err(|_| ImportError::RelativePath(path.to_path_buf()))
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Provider does not offer a file URL (type {0})")]
    UnsupportedType(String),

    #[error("Not a local file URL: {0}")]
    NotAFileUrl(String),

    #[error("Malformed file URL: {0}")]
    InvalidUrl(String),

    #[error("Cannot build a file URL for relative path {}", .0.display())]
    RelativePath(PathBuf),

    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to decode {}: {source}", path.display())]
    Decode { path: PathBuf, source: CodecError },

    #[error("Import worker failed: {0}")]
    Worker(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_file_url_resolves() {
        let path = file_url_to_path("file:///Users/me/shot.png").unwrap();
        assert_eq!(path, PathBuf::from("/Users/me/shot.png"));
    }

    #[test]
    fn localhost_host_is_accepted() {
        let path = file_url_to_path("FILE://localhost/tmp/a.png").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/a.png"));
    }

    #[test]
    fn percent_escapes_are_decoded() {
        let path = file_url_to_path("file:///tmp/My%20Shots/caf%C3%A9.png").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/My Shots/café.png"));
    }

    #[test]
    fn remote_and_non_file_urls_are_rejected() {
        assert!(matches!(
            file_url_to_path("https://example.com/a.png"),
            Err(ImportError::NotAFileUrl(_))
        ));
        assert!(matches!(
            file_url_to_path("file://server/share/a.png"),
            Err(ImportError::NotAFileUrl(_))
        ));
    }

    #[test]
    fn unparseable_url_is_invalid() {
        assert!(matches!(
            file_url_to_path("just some words"),
            Err(ImportError::InvalidUrl(_))
        ));
    }

    #[test]
    fn query_and_fragment_are_not_part_of_the_path() {
        let path = file_url_to_path("file:///tmp/a.png?x=1#top").unwrap();
        assert_eq!(path, PathBuf::from("/tmp/a.png"));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_names_are_kept_byte_for_byte() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let expected = PathBuf::from(OsStr::from_bytes(b"/tmp/caf\xE9.png"));
        let path = file_url_to_path("file:///tmp/caf%E9.png").unwrap();
        assert_eq!(path, expected);

        let url = path_to_file_url(&expected).unwrap();
        assert_eq!(file_url_to_path(url.as_str()).unwrap(), expected);
    }

    #[test]
    fn path_url_round_trip() {
        let original = PathBuf::from("/tmp/Screen Shot 100%.png");
        let url = path_to_file_url(&original).unwrap();
        assert!(url.as_str().starts_with("file:///tmp/Screen%20Shot"));
        assert_eq!(file_url_to_path(url.as_str()).unwrap(), original);
    }

    #[test]
    fn relative_path_has_no_file_url() {
        assert!(matches!(
            ItemProvider::file_path(Path::new("shots/a.png")),
            Err(ImportError::RelativePath(_))
        ));
    }

    #[test]
    fn provider_conformance_is_by_type() {
        let url = ItemProvider::file_url("file:///tmp/a.png");
        let text = ItemProvider::new("public.plain-text", "hello");
        assert!(url.has_item_conforming_to(FILE_URL_TYPE));
        assert!(!text.has_item_conforming_to(FILE_URL_TYPE));
    }

    #[test]
    fn report_counts() {
        let report = DropReport {
            accepted: true,
            ignored: 1,
            outcomes: vec![
                ItemOutcome {
                    position: 0,
                    result: Ok(PathBuf::from("/a.png")),
                },
                ItemOutcome {
                    position: 2,
                    result: Err(ImportError::NotAFileUrl("x".into())),
                },
            ],
        };
        assert_eq!(report.imported(), 1);
        assert_eq!(report.failed(), 1);
        assert!(report.handled());
        assert!(!DropReport::default().handled());
    }
}
