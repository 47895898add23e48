use std::collections::HashSet;
use uuid::Uuid;

const ID_PREFIX: char = '_';
const ID_LEN: usize = 9;
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Hands out compact node ids, e.g. `_k3j9x0q2a`.
///
/// Every id the generator has produced or been told about stays reserved for
/// the lifetime of the generator, so an id freed by a deletion is never
/// handed out again.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    issued: HashSet<String>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generate(&mut self) -> String {
        loop {
            let candidate = random_id();
            if self.issued.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Marks an externally supplied id (e.g. from a loaded document) as taken.
    pub fn reserve(&mut self, id: &str) {
        self.issued.insert(id.to_string());
    }

    pub fn is_reserved(&self, id: &str) -> bool {
        self.issued.contains(id)
    }
}

fn random_id() -> String {
    let mut bits = Uuid::new_v4().as_u128();
    let mut id = String::with_capacity(ID_LEN + 1);
    id.push(ID_PREFIX);
    for _ in 0..ID_LEN {
        id.push(ALPHABET[(bits % 36) as usize] as char);
        bits /= 36;
    }
    id
}
