use chrono::{DateTime, Utc};

/// Where the next poll resumes: the upstream continuation token plus a fixed
/// floor on publish time.
///
/// Lives in memory only. A restart begins again from the first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationCursor {
    next_token: String,
    lower_bound: DateTime<Utc>,
}

impl PaginationCursor {
    /// Start-of-results cursor with the given publish-time floor.
    pub fn new(lower_bound: DateTime<Utc>) -> Self {
        Self {
            next_token: String::new(),
            lower_bound,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = token.into();
        self
    }

    /// `(next_token, lower_bound)` for the next request.
    pub fn snapshot(&self) -> (String, DateTime<Utc>) {
        (self.next_token.clone(), self.lower_bound)
    }

    pub fn next_token(&self) -> &str {
        &self.next_token
    }

    pub fn lower_bound(&self) -> DateTime<Utc> {
        self.lower_bound
    }

    /// Replace the token. The value is opaque and never validated.
    pub fn advance(&mut self, new_token: impl Into<String>) {
        self.next_token = new_token.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floor() -> DateTime<Utc> {
        "2024-01-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn starts_at_beginning_of_results() {
        let cursor = PaginationCursor::new(floor());
        assert_eq!(cursor.snapshot(), (String::new(), floor()));
    }

    #[test]
    fn advance_replaces_token_and_keeps_floor() {
        let mut cursor = PaginationCursor::new(floor()).with_token("T0");
        cursor.advance("T1");
        assert_eq!(cursor.snapshot(), ("T1".to_string(), floor()));

        // An empty token from the last page sends us back to the start.
        cursor.advance("");
        assert_eq!(cursor.next_token(), "");
        assert_eq!(cursor.lower_bound(), floor());
    }
}
