//! Map service-crate errors into the core error hierarchy so the UI can
//! show consistent user messages.

use weatherpin_core::{error, AppError};
use weatherpin_weather::LocationError;

pub fn location_app_error(e: &LocationError) -> AppError {
    let mapped = match e {
        LocationError::PermissionDenied => error::LocationError::PermissionDenied,
        LocationError::ServiceUnavailable => error::LocationError::ServiceUnavailable,
        LocationError::Timeout => error::LocationError::Timeout,
        LocationError::Other(msg) => error::LocationError::Other(msg.clone()),
    };
    AppError::Location(mapped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_keeps_its_user_message() {
        let app_error = location_app_error(&LocationError::PermissionDenied);
        assert!(app_error.user_message().contains("denied"));
    }

    #[test]
    fn unavailable_service_maps_across() {
        let app_error = location_app_error(&LocationError::ServiceUnavailable);
        assert!(matches!(
            app_error,
            AppError::Location(error::LocationError::ServiceUnavailable)
        ));
    }
}
