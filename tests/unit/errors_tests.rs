/*!
 * Tests for error types and conversions
 */

use pageglot::errors::{AppError, DocumentError, LayoutError, ProviderError, TranslationError};

#[test]
fn test_error_messages_should_carry_context() {
    let error = TranslationError::Exhausted {
        attempts: 3,
        last: ProviderError::EchoedInput,
    };
    assert_eq!(
        error.to_string(),
        "Translation failed after 3 attempts: Backend echoed the input instead of translating it"
    );

    let error = ProviderError::ApiError {
        status_code: 503,
        message: "busy".to_string(),
    };
    assert_eq!(error.to_string(), "API responded with error: 503 - busy");

    assert!(DocumentError::PageNotFound(4).to_string().contains('4'));
    assert!(
        LayoutError::PageTooSmall { width: 10.0, height: 10.0, font_size: 12.0 }
            .to_string()
            .contains("12")
    );
}

#[test]
fn test_app_error_should_wrap_lower_level_errors() {
    let app: AppError = DocumentError::Load("broken.pdf".to_string()).into();
    assert!(matches!(app, AppError::Document(_)));

    let app: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(app, AppError::File(_)));

    let app: AppError = anyhow::anyhow!("odd").into();
    assert!(matches!(app, AppError::Unknown(message) if message == "odd"));

    let app: AppError = TranslationError::Provider(ProviderError::EmptyTranslation).into();
    assert!(app.to_string().starts_with("Translation error"));
}
