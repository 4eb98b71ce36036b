use widget::{DatasetFetcher, FetchError};

/// Reads datasets from the local filesystem; URIs are paths.
#[derive(Debug, Default, Copy, Clone)]
pub struct FileFetcher;

impl DatasetFetcher for FileFetcher {
    async fn fetch(&self, uri: &str) -> Result<String, FetchError> {
        std::fs::read_to_string(uri).map_err(|e| FetchError::new(format!("read {uri}: {e}")))
    }
}
