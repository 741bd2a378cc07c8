use std::collections::{HashSet, VecDeque};

/// Bounded, insertion-ordered record of listing tokens already delivered.
///
/// Once `cap` is exceeded the oldest tokens are evicted first.
#[derive(Debug, Clone)]
pub struct SeenSet {
    order: VecDeque<String>,
    index: HashSet<String>,
    cap: usize,
}

impl SeenSet {
    pub fn new(cap: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(cap.min(1024)),
            index: HashSet::new(),
            cap: cap.max(1),
        }
    }

    /// Rebuild from a persisted array (oldest first). Only the most recent
    /// `cap` tokens survive.
    pub fn from_tokens<I>(tokens: I, cap: usize) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut set = Self::new(cap);
        for token in tokens {
            set.insert(token);
        }
        set
    }

    pub fn contains(&self, token: &str) -> bool {
        self.index.contains(token)
    }

    /// Record a token. Returns false if it was already present.
    pub fn insert(&mut self, token: String) -> bool {
        if self.index.contains(&token) {
            return false;
        }
        self.index.insert(token.clone());
        self.order.push_back(token);
        while self.order.len() > self.cap {
            if let Some(old) = self.order.pop_front() {
                self.index.remove(&old);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Oldest first, the persisted order.
    pub fn to_vec(&self) -> Vec<String> {
        self.order.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent() {
        let mut seen = SeenSet::new(10);
        assert!(seen.insert("a".into()));
        assert!(!seen.insert("a".into()));
        assert_eq!(seen.len(), 1);
        assert!(seen.contains("a"));
        assert!(!seen.contains("b"));
    }

    #[test]
    fn test_never_exceeds_cap_and_evicts_oldest_first() {
        let cap = 1000;
        let mut seen = SeenSet::new(cap);
        for i in 0..2500 {
            seen.insert(format!("tok-{i}"));
            assert!(seen.len() <= cap);
        }
        assert_eq!(seen.len(), cap);
        assert!(!seen.contains("tok-1499"));
        assert!(seen.contains("tok-1500"));
        assert!(seen.contains("tok-2499"));
        assert_eq!(seen.to_vec()[0], "tok-1500");
    }

    #[test]
    fn test_reinserting_does_not_refresh_position() {
        let mut seen = SeenSet::new(2);
        seen.insert("a".into());
        seen.insert("b".into());
        seen.insert("a".into());
        seen.insert("c".into());
        assert_eq!(seen.to_vec(), vec!["b", "c"]);
    }

    #[test]
    fn test_from_tokens_keeps_most_recent() {
        let persisted: Vec<String> = (0..8).map(|i| i.to_string()).collect();
        let seen = SeenSet::from_tokens(persisted, 3);
        assert_eq!(seen.to_vec(), vec!["5", "6", "7"]);
    }
}
