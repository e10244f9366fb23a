/*!
 * Error types for the pageglot application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with translation backends
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error related to rate limiting
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// The backend answered with nothing
    #[error("Backend returned an empty translation")]
    EmptyTranslation,

    /// The backend answered with the input text unchanged
    #[error("Backend echoed the input instead of translating it")]
    EchoedInput,
}

/// Errors raised by the script shaping stack
#[derive(Error, Debug)]
pub enum ShapingError {
    /// The reshaper or bidi reorderer panicked
    #[error("Shaping panicked: {0}")]
    Panicked(String),

    /// The input could not be shaped
    #[error("Shaping failed: {0}")]
    Failed(String),
}

/// Reasons a translated block could not be placed on a page
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// Nothing left to draw
    #[error("Block has no text to draw")]
    EmptyText,

    /// A coordinate or size is NaN or infinite
    #[error("Non-finite geometry: {0}")]
    NonFiniteGeometry(String),

    /// Not even one character fits between the margins
    #[error("Page {width}x{height} is too small for text of size {font_size}")]
    PageTooSmall {
        width: f64,
        height: f64,
        font_size: f64,
    },
}

/// Errors that can occur while reading or writing page documents
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The document could not be opened or parsed
    #[error("Failed to load document: {0}")]
    Load(String),

    /// The document could not be written
    #[error("Failed to save document: {0}")]
    Save(String),

    /// The requested page does not exist
    #[error("Page {0} not found")]
    PageNotFound(u32),

    /// A page content stream could not be read or written
    #[error("Content stream error: {0}")]
    Content(String),

    /// Error surfaced by the PDF library
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}

/// Errors that can occur during translation
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Error from the provider API
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Every attempt failed
    #[error("Translation failed after {attempts} attempts: {last}")]
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// The error from the final attempt
        last: ProviderError,
    },
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from document handling
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
