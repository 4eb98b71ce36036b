use std::future::Future;

use formats::FeatureCollectionError;

/// Relative path of the bundled municipal dataset.
pub const DEFAULT_DATASET_URI: &str = "geojson-tocantins.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FetchError {}

/// Fetches dataset text by URI.
pub trait DatasetFetcher {
    fn fetch(&self, uri: &str) -> impl Future<Output = Result<String, FetchError>>;
}

#[derive(Debug)]
pub enum LoadError {
    Fetch { uri: String, source: FetchError },
    Parse { uri: String, source: FeatureCollectionError },
}

impl LoadError {
    pub fn uri(&self) -> &str {
        match self {
            LoadError::Fetch { uri, .. } | LoadError::Parse { uri, .. } => uri,
        }
    }
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Fetch { uri, source } => write!(f, "failed to fetch {uri}: {source}"),
            LoadError::Parse { uri, source } => write!(f, "failed to parse {uri}: {source}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Fetch { source, .. } => Some(source),
            LoadError::Parse { source, .. } => Some(source),
        }
    }
}

/// Panel shown in place of the map when loading fails. The retry action
/// reloads the host page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorPanel {
    pub title: String,
    pub message: String,
    pub retry_label: String,
}

impl ErrorPanel {
    pub fn for_dataset(uri: &str) -> Self {
        Self {
            title: "Erro ao carregar o mapa".to_string(),
            message: format!(
                "Erro ao carregar os dados do mapa. Verifique se o arquivo {uri} está presente."
            ),
            retry_label: "Tentar novamente".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panel_names_the_dataset() {
        let panel = ErrorPanel::for_dataset(DEFAULT_DATASET_URI);
        assert_eq!(panel.title, "Erro ao carregar o mapa");
        assert_eq!(
            panel.message,
            "Erro ao carregar os dados do mapa. Verifique se o arquivo geojson-tocantins.json está presente."
        );
        assert_eq!(panel.retry_label, "Tentar novamente");
    }

    #[test]
    fn load_error_reports_uri_and_source() {
        let err = LoadError::Fetch {
            uri: "a.json".to_string(),
            source: FetchError::new("404"),
        };
        assert_eq!(err.uri(), "a.json");
        assert_eq!(err.to_string(), "failed to fetch a.json: 404");
        assert!(std::error::Error::source(&err).is_some());
    }
}
