use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{distributions::Uniform, Rng};

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(String);

impl AnnotationId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Millisecond timestamp followed by nine random base-36 characters.
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        let mut rng = rand::thread_rng();
        let alphabet = Uniform::from(0..BASE36.len());
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| char::from(BASE36[rng.sample(alphabet)]))
            .collect();
        Self(format!("{millis}{suffix}"))
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnnotationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_end_with_base36_suffix() {
        let id = AnnotationId::generate();
        let value = id.as_str();
        assert!(value.len() > SUFFIX_LEN);
        assert!(value[value.len() - SUFFIX_LEN..]
            .bytes()
            .all(|byte| BASE36.contains(&byte)));
    }

    #[test]
    fn generated_ids_are_distinct_within_same_millisecond() {
        let ids: HashSet<_> = (0..64).map(|_| AnnotationId::generate()).collect();
        assert_eq!(ids.len(), 64);
    }
}
