use crate::transport::TransportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    // Validations locales : la requête n'est jamais envoyée
    #[error("Missing required option: {0}")]
    MissingOption(&'static str),
    #[error("Invalid subscription frequency: {0}")]
    InvalidFrequency(String),
    #[error("Unsupported card brand: {0}")]
    UnsupportedCardBrand(String),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Reply parse error: {0}")]
    Parse(#[from] cybsoap::SoapParseError),
    #[error("Request build error: {0}")]
    RequestBuild(#[from] xmltree::Error),
}
