//! Property tests for error classification.

use portico_core::{classify, Error, HttpCode, HttpError, StatusCode};
use proptest::prelude::*;

fn error_status() -> impl Strategy<Value = StatusCode> {
    (400u16..600).prop_filter_map("valid status", |code| StatusCode::from_u16(code).ok())
}

proptest! {
    #[test]
    fn plain_errors_are_internal_with_their_message(message in "[a-z ]{1,40}") {
        let (status, response) = classify(Error::msg(&message));
        prop_assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        prop_assert_eq!(response.error_text, message);
        prop_assert!(response.context.is_none());
    }

    #[test]
    fn capability_status_always_wins(transport in error_status(), explicit in error_status()) {
        let err = HttpError::with_message(transport, "x").with_internal(HttpCode(explicit));
        let (status, _) = classify(err.into());
        prop_assert_eq!(status, explicit);
    }

    #[test]
    fn reason_phrase_never_leaks(status in error_status()) {
        let (resolved, response) = classify(HttpError::new(status).into());
        prop_assert_eq!(resolved, status);
        if let Some(reason) = status.canonical_reason() {
            prop_assert_ne!(response.error_text.as_str(), reason);
        }
    }

    #[test]
    fn classification_is_deterministic(code in any::<i64>(), message in "[a-z]{1,12}") {
        let build = || Error::msg(&message).with_code(code).with_status(StatusCode::CONFLICT);
        let (_, first) = classify(build());
        let (_, second) = classify(build());
        prop_assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }
}
