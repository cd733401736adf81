//! Download executor
//!
//! Materializes media under the download directory. Output paths are
//! deterministic (`<dir>/<title or id>.<ext>`), so an existing file is the
//! cache: it is returned without touching the network.

use crate::resolver::extractor::{MediaExtractor, OptionProfiles};
use crate::resolver::links;
use crate::types::{DownloadMode, DownloadOutcome, DownloadSpec, MediaKind};
use crate::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

/// Container of every video download
pub const VIDEO_CONTAINER: &str = "mp4";

type TargetLocks = Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>;

#[derive(Debug)]
pub struct DownloadExecutor<E> {
    extractor: Arc<E>,
    profiles: OptionProfiles,
    directory: PathBuf,
    /// Serializes work on the same output file
    locks: TargetLocks,
}

impl<E: MediaExtractor> DownloadExecutor<E> {
    pub fn new(extractor: Arc<E>, profiles: OptionProfiles, directory: impl Into<PathBuf>) -> Self {
        Self {
            extractor,
            profiles,
            directory: directory.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Download `link` (already normalized) as described by `spec`.
    ///
    /// Every failure is reported as [`Error::Download`].
    pub async fn download(
        &self,
        link: &str,
        spec: &DownloadSpec,
        user_agent: &str,
    ) -> Result<DownloadOutcome> {
        self.execute(link, spec, user_agent)
            .await
            .map_err(|e| match e {
                Error::Download(_) => e,
                other => Error::download(other.to_string()),
            })
    }

    async fn execute(
        &self,
        link: &str,
        spec: &DownloadSpec,
        user_agent: &str,
    ) -> Result<DownloadOutcome> {
        fs::create_dir_all(&self.directory).await.map_err(|e| {
            Error::download(format!(
                "Cannot create {}: {}",
                self.directory.display(),
                e
            ))
        })?;

        let mode = spec.mode();
        let stem = match spec.title.as_deref().map(sanitize_stem) {
            Some(title) if !title.is_empty() => title,
            _ => self.video_id(link, user_agent).await?,
        };
        let target = self
            .directory
            .join(format!("{}.{}", stem, self.extension(spec.kind)));

        let lock = self.lock_for(&target).await;
        let result = {
            let _guard = lock.lock().await;
            self.fetch_into(link, spec, mode, &stem, &target, user_agent)
                .await
        };
        drop(lock);
        self.release(&target).await;

        result
    }

    async fn fetch_into(
        &self,
        link: &str,
        spec: &DownloadSpec,
        mode: DownloadMode,
        stem: &str,
        target: &Path,
        user_agent: &str,
    ) -> Result<DownloadOutcome> {
        if fs::try_exists(target).await.unwrap_or(false) {
            tracing::info!("Reusing existing file {}", target.display());
            return Ok(DownloadOutcome {
                path: target.to_path_buf(),
                reused: true,
            });
        }

        let template = self.output_template(stem);
        let format_id = spec.format_id.as_deref();
        let options = match mode {
            DownloadMode::VideoSnippet | DownloadMode::FullVideo => self
                .profiles
                .video(user_agent, format_id)
                .with_container(VIDEO_CONTAINER),
            DownloadMode::AudioSnippet | DownloadMode::Audio => {
                self.profiles.audio(user_agent, format_id)
            }
        }
        .with_output_template(template);

        tracing::info!("Downloading {} as {:?} to {}", link, mode, target.display());
        let reported = self.extractor.download(link, &options).await?;

        if !fs::try_exists(target).await.unwrap_or(false) {
            self.adopt_reported_output(reported, target).await?;
        }

        Ok(DownloadOutcome {
            path: target.to_path_buf(),
            reused: false,
        })
    }

    /// Video id from the link itself, else from the extractor
    async fn video_id(&self, link: &str, user_agent: &str) -> Result<String> {
        if let Some(id) = links::extract_video_id(link) {
            return Ok(id.to_string());
        }

        let info = self
            .extractor
            .extract_info(link, &self.profiles.base(user_agent))
            .await?
            .into_first_entry()?;

        info.id
            .map(|id| sanitize_stem(&id))
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::download(format!("Could not determine video id for {}", link)))
    }

    /// `yt-dlp` output template writing `<stem>.<ext>` into the directory
    fn output_template(&self, stem: &str) -> String {
        // `%` starts a template field
        let escaped = stem.replace('%', "%%");
        self.directory
            .join(format!("{}.%(ext)s", escaped))
            .to_string_lossy()
            .into_owned()
    }

    fn extension(&self, kind: MediaKind) -> &'static str {
        match kind {
            MediaKind::Audio => self.profiles.audio_extension(),
            MediaKind::Video => VIDEO_CONTAINER,
        }
    }

    /// Move the file the extractor reported writing onto the target.
    ///
    /// Only that file is considered; other files sharing the stem belong to
    /// other downloads.
    async fn adopt_reported_output(&self, reported: Option<PathBuf>, target: &Path) -> Result<()> {
        let produced = match reported {
            Some(path)
                if path.parent() == Some(self.directory.as_path())
                    && fs::try_exists(&path).await.unwrap_or(false) =>
            {
                path
            }
            _ => {
                return Err(Error::download(format!(
                    "Expected output {} was not produced",
                    target.display()
                )));
            }
        };

        tracing::debug!("Renaming {} to {}", produced.display(), target.display());
        fs::rename(&produced, target).await?;
        Ok(())
    }

    async fn lock_for(&self, target: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        Arc::clone(locks.entry(target.to_path_buf()).or_default())
    }

    /// Drop the lock entry once nobody else holds it
    async fn release(&self, target: &Path) {
        let mut locks = self.locks.lock().await;
        if locks
            .get(target)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(target);
        }
    }
}

/// File stem safe to place inside the download directory
fn sanitize_stem(raw: &str) -> String {
    raw.trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}
