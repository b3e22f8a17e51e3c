use std::collections::BTreeMap;

/// Raw tag tokens discovered so far for one artifact category, keyed by
/// artifact id. Duplicates and tokens that will later be discarded are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagAccumulator {
    entries: BTreeMap<String, Vec<String>>,
}

impl TagAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend the entry for `artifact_id` with `tokens`, creating it if needed.
    /// An empty `tokens` never creates an entry.
    pub fn append_or_create<I>(&mut self, artifact_id: &str, tokens: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut tokens = tokens.into_iter().peekable();
        if tokens.peek().is_none() {
            return;
        }
        match self.entries.get_mut(artifact_id) {
            Some(existing) => existing.extend(tokens),
            None => {
                self.entries.insert(artifact_id.to_string(), tokens.collect());
            }
        }
    }

    /// Make sure `artifact_id` has an entry, even an empty one.
    pub fn register(&mut self, artifact_id: &str) {
        if !self.entries.contains_key(artifact_id) {
            self.entries.insert(artifact_id.to_string(), Vec::new());
        }
    }

    pub fn get(&self, artifact_id: &str) -> Option<&[String]> {
        self.entries.get(artifact_id).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(id, tokens)| (id.as_str(), tokens.as_slice()))
    }
}
