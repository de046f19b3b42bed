use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CrawlerError {
    #[error("Configuration error")]
    ConfigError(#[from] ConfigError),

    #[error("Http client error")]
    HttpError(#[from] reqwest::Error),

    #[error("Io error")]
    IoError(#[from] std::io::Error),

    #[error("Csv error")]
    CsvError(#[from] csv::Error),

    #[error("Json error")]
    JsonError(#[from] serde_json::Error),

    #[error("Xlsx error")]
    XlsxError(#[from] rust_xlsxwriter::XlsxError),
}
