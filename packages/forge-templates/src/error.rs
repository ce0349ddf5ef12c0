use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template engine error: {0}")]
    Engine(#[from] tera::Error),

    #[error("Template {template} calls unregistered helper: {name}")]
    MissingHelper { template: String, name: String },

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, TemplateError>;
