use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog has no usable rows (a non-empty name column is required)")]
    NoUsableRows,
}

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("could not read dictionary file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse dictionary file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("could not parse dictionary document: {0}")]
    Parse(#[from] toml::de::Error),
}
