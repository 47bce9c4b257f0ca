//! Terminal output for the session.

use videology_core::{ConversionSession, SessionStatus};

/// Progress ratio as a whole percentage.
pub fn percent(progress: f64) -> u32 {
    (progress.clamp(0.0, 1.0) * 100.0).round() as u32
}

pub fn progress_line(progress: f64) -> String {
    format!("Converting..... {}%", percent(progress))
}

/// Whether the run ended in a way that warrants exit code 0.
pub fn is_success(session: &ConversionSession) -> bool {
    session.status == SessionStatus::Succeeded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_line() {
        assert_eq!(progress_line(0.0), "Converting..... 0%");
        assert_eq!(progress_line(0.05), "Converting..... 5%");
        assert_eq!(progress_line(1.0), "Converting..... 100%");
        assert_eq!(progress_line(3.0), "Converting..... 100%");
    }

    #[test]
    fn test_is_success() {
        let mut session = ConversionSession::default();
        assert!(!is_success(&session));

        session.status = SessionStatus::Succeeded;
        assert!(is_success(&session));

        session.status = SessionStatus::Cancelled;
        assert!(!is_success(&session));
    }
}
