use tubefeed_common::TubefeedError;

/// Fixed pool of API keys, advanced round-robin on quota rejection.
#[derive(Debug, Clone)]
pub struct KeyRotator {
    keys: Vec<String>,
    current: usize,
}

impl KeyRotator {
    /// Fails on an empty pool: there would be no key to send.
    pub fn new(keys: Vec<String>) -> Result<Self, TubefeedError> {
        if keys.is_empty() {
            return Err(TubefeedError::Config(
                "API key pool must not be empty".to_string(),
            ));
        }
        Ok(Self { keys, current: 0 })
    }

    /// Start from an arbitrary position. The index is taken modulo pool size.
    pub fn with_index(mut self, index: usize) -> Self {
        self.current = index % self.keys.len();
        self
    }

    /// The key in use. No side effects.
    pub fn current(&self) -> &str {
        &self.keys[self.current]
    }

    pub fn index(&self) -> usize {
        self.current
    }

    /// Pool size. Never zero, see `new`.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Move to the next key (wrapping) and return it.
    pub fn rotate(&mut self) -> &str {
        self.current = (self.current + 1) % self.keys.len();
        &self.keys[self.current]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(n: usize) -> KeyRotator {
        KeyRotator::new((0..n).map(|i| format!("key-{i}")).collect()).unwrap()
    }

    #[test]
    fn empty_pool_is_rejected() {
        assert!(KeyRotator::new(Vec::new()).is_err());
    }

    #[test]
    fn len_counts_the_pool() {
        assert_eq!(pool(3).len(), 3);
        assert_eq!(pool(1).with_index(4).len(), 1);
    }

    #[test]
    fn current_has_no_side_effect() {
        let rotator = pool(3);
        assert_eq!(rotator.current(), "key-0");
        assert_eq!(rotator.current(), "key-0");
        assert_eq!(rotator.index(), 0);
    }

    #[test]
    fn rotate_wraps_around() {
        let mut rotator = pool(3);
        assert_eq!(rotator.rotate(), "key-1");
        assert_eq!(rotator.rotate(), "key-2");
        assert_eq!(rotator.rotate(), "key-0");
        assert_eq!(rotator.index(), 0);
    }

    #[test]
    fn single_key_pool_rotates_onto_itself() {
        let mut rotator = pool(1);
        assert_eq!(rotator.rotate(), "key-0");
        assert_eq!(rotator.index(), 0);
    }

    #[test]
    fn with_index_wraps() {
        let rotator = pool(2).with_index(5);
        assert_eq!(rotator.index(), 1);
        assert_eq!(rotator.current(), "key-1");
    }
}
