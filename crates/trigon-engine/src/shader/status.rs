use std::fmt;

/// Size of the diagnostic buffer, terminator included.
pub const INFO_LOG_CAPACITY: usize = 512;

/// Diagnostic text produced by a failed compile or link.
///
/// Holds at most `INFO_LOG_CAPACITY - 1` characters; longer logs are cut.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct InfoLog(String);

impl InfoLog {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let limit = INFO_LOG_CAPACITY - 1;

        match text.char_indices().nth(limit) {
            Some((cut, _)) => Self(text[..cut].to_string()),
            None => Self(text),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for InfoLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a compile or link query.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BuildStatus {
    Success,
    Failed(InfoLog),
}

impl BuildStatus {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, BuildStatus::Success)
    }

    pub fn info_log(&self) -> Option<&InfoLog> {
        match self {
            BuildStatus::Success => None,
            BuildStatus::Failed(log) => Some(log),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_log_is_kept_verbatim() {
        let log = InfoLog::new("error: expected ';'");
        assert_eq!(log.as_str(), "error: expected ';'");
    }

    #[test]
    fn long_log_is_cut_to_511_chars() {
        let log = InfoLog::new("x".repeat(2000));
        assert_eq!(log.as_str().chars().count(), INFO_LOG_CAPACITY - 1);
    }

    #[test]
    fn cut_respects_char_boundaries() {
        let log = InfoLog::new("é".repeat(600));
        assert_eq!(log.as_str().chars().count(), 511);
        assert!(log.as_str().chars().all(|c| c == 'é'));
    }

    #[test]
    fn exactly_511_chars_is_untouched() {
        let text = "y".repeat(511);
        assert_eq!(InfoLog::new(text.clone()).as_str(), text);
    }

    #[test]
    fn status_exposes_log_only_on_failure() {
        assert!(BuildStatus::Success.info_log().is_none());
        let failed = BuildStatus::Failed(InfoLog::new("boom"));
        assert!(!failed.is_success());
        assert_eq!(failed.info_log().map(InfoLog::as_str), Some("boom"));
    }
}
