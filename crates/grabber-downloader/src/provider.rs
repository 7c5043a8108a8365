use serde::Deserialize;

/// Format entry as reported by the provider. Every field except the id and
/// extension may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderFormat {
    pub format_id: String,
    #[serde(default)]
    pub ext: String,
    pub format_note: Option<String>,
    pub resolution: Option<String>,
    pub filesize: Option<f64>,
    pub filesize_approx: Option<f64>,
    pub acodec: Option<String>,
    pub vcodec: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// Video information as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderMetadata {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub duration: Option<f64>,
    pub uploader: Option<String>,
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub formats: Vec<ProviderFormat>,
}
