use regex::Regex;

use fwpipe_core::{VisitResult, VisitorError};

/// Whole-name regex match shared by the search and edit visitors.
#[derive(Debug, Clone)]
pub(crate) struct NameMatcher {
    pattern: String,
    regex: Regex,
}

impl NameMatcher {
    pub(crate) fn new(visitor: &str, pattern: &str) -> VisitResult<Self> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))
            .map_err(|e| VisitorError::invalid_argument(visitor, pattern, e.to_string()))?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub(crate) fn is_match(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub(crate) fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Tracks the `/`-joined path of the node currently being visited.
#[derive(Debug, Default)]
pub(crate) struct PathTracker {
    segments: Vec<String>,
}

impl PathTracker {
    pub(crate) fn enter(&mut self, name: &str) {
        self.segments.push(name.to_string());
    }

    pub(crate) fn leave(&mut self) {
        self.segments.pop();
    }

    pub(crate) fn current(&self) -> String {
        self.segments.join("/")
    }

    pub(crate) fn clear(&mut self) {
        self.segments.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_is_anchored() {
        let m = NameMatcher::new("find", "Dxe.*").unwrap();
        assert!(m.is_match("DxeCore"));
        assert!(!m.is_match("PeiDxeCore"));
        assert_eq!(m.pattern(), "Dxe.*");
    }

    #[test]
    fn test_alternation_stays_anchored() {
        let m = NameMatcher::new("find", "a|b").unwrap();
        assert!(m.is_match("b"));
        assert!(!m.is_match("ab"));
    }

    #[test]
    fn test_bad_pattern_is_invalid_argument() {
        let err = NameMatcher::new("find", "(").unwrap_err();
        assert!(matches!(err, VisitorError::InvalidArgument { ref visitor, .. } if visitor == "find"));
    }

    #[test]
    fn test_path_tracker() {
        let mut path = PathTracker::default();
        path.enter("bios.rom");
        path.enter("FV_MAIN");
        assert_eq!(path.current(), "bios.rom/FV_MAIN");
        path.leave();
        assert_eq!(path.current(), "bios.rom");
        path.clear();
        assert_eq!(path.current(), "");
    }
}
