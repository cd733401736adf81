//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

/// Test helper functions
#[allow(dead_code)]
pub mod helpers {
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use yt_resolver::resolver::{ExtractOptions, ExtractedInfo, MediaExtractor};
    use yt_resolver::{Error, Result, config::Settings};

    /// Settings with no request spacing, pointing at local mock servers
    pub fn create_test_settings(
        search_endpoint: &str,
        mirrors: Vec<String>,
        download_dir: &Path,
    ) -> Settings {
        let mut settings = Settings::default();
        settings.rate_limit.initial_delay_secs = 0.0;
        settings.rate_limit.min_delay_secs = 0.0;
        settings.rate_limit.max_delay_secs = 0.0;
        settings.youtube.search_endpoint = search_endpoint.to_string();
        settings.proxy.instances = mirrors;
        settings.proxy.timeout_secs = 2;
        settings.http.timeout_secs = 2;
        settings.download.directory = download_dir.to_path_buf();
        settings
    }

    /// What the scripted extractor answers to `extract_info`
    #[derive(Debug, Clone)]
    pub enum InfoReply {
        Info(serde_json::Value),
        Failure(String),
    }

    /// Extractor returning a fixed reply and counting calls.
    ///
    /// `download` writes the file named by the output template, with
    /// `%(id)s` and `%(ext)s` filled in.
    #[derive(Debug)]
    pub struct ScriptedExtractor {
        reply: InfoReply,
        produced_ext: String,
        pub info_calls: AtomicUsize,
        pub download_calls: AtomicUsize,
        pub links: Mutex<Vec<String>>,
    }

    impl ScriptedExtractor {
        pub fn new(reply: InfoReply) -> Self {
            Self {
                reply,
                produced_ext: "mp3".to_string(),
                info_calls: AtomicUsize::new(0),
                download_calls: AtomicUsize::new(0),
                links: Mutex::new(Vec::new()),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self::new(InfoReply::Failure(message.to_string()))
        }

        pub fn producing(mut self, ext: &str) -> Self {
            self.produced_ext = ext.to_string();
            self
        }

        pub fn info_calls(&self) -> usize {
            self.info_calls.load(Ordering::SeqCst)
        }

        pub fn download_calls(&self) -> usize {
            self.download_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MediaExtractor for ScriptedExtractor {
        async fn extract_info(&self, link: &str, _options: &ExtractOptions) -> Result<ExtractedInfo> {
            self.info_calls.fetch_add(1, Ordering::SeqCst);
            self.links.lock().unwrap().push(link.to_string());
            match &self.reply {
                InfoReply::Info(value) => Ok(serde_json::from_value(value.clone())?),
                InfoReply::Failure(message) => Err(Error::extractor(message.clone())),
            }
        }

        async fn download(&self, _link: &str, options: &ExtractOptions) -> Result<Option<PathBuf>> {
            self.download_calls.fetch_add(1, Ordering::SeqCst);
            let template = options
                .output_template
                .clone()
                .ok_or_else(|| Error::extractor("no output template"))?;
            let path = template
                .replace("%(id)s", "dQw4w9WgXcQ")
                .replace("%(ext)s", &self.produced_ext)
                .replace("%%", "%");
            tokio::fs::write(&path, b"media").await?;
            Ok(Some(PathBuf::from(path)))
        }
    }
}
