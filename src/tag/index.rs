//! In-memory tag index.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use super::derive::auto_tags;

/// Tag set for a single file path.
pub type TagSet = BTreeSet<String>;

/// Mapping from logical file path to its tags.
///
/// The outer map is only write-locked to insert a new path. Each path's tag
/// set has its own mutex, so a read-modify-write on one path is a single
/// critical section and unrelated paths never wait on each other.
///
/// Entries live as long as the index; removing every tag leaves an empty set.
#[derive(Debug, Default)]
pub struct TagIndex {
    entries: RwLock<HashMap<String, Arc<Mutex<TagSet>>>>,
}

impl TagIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, file_path: &str) -> Option<Arc<Mutex<TagSet>>> {
        self.entries.read().await.get(file_path).cloned()
    }

    async fn entry_or_insert(&self, file_path: &str) -> Arc<Mutex<TagSet>> {
        if let Some(entry) = self.entry(file_path).await {
            return entry;
        }

        let mut entries = self.entries.write().await;
        Arc::clone(entries.entry(file_path.to_string()).or_default())
    }

    /// Derive tags from the path segments and file name, then add them.
    pub async fn auto_tag(&self, file_path: &str) {
        let tags = auto_tags(file_path);
        debug!(file_path, count = tags.len(), "Auto-tagging file");
        self.add_tags(file_path, tags).await;
    }

    /// Add tags to a file, creating its entry if needed.
    ///
    /// Tags are trimmed; empty tags are ignored.
    pub async fn add_tags<I, S>(&self, file_path: &str, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags = normalize(tags);
        let entry = self.entry_or_insert(file_path).await;
        entry.lock().await.extend(tags);
    }

    /// Remove tags from a file. Unknown paths are left untouched.
    pub async fn remove_tags<I, S>(&self, file_path: &str, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tags = normalize(tags);
        if let Some(entry) = self.entry(file_path).await {
            entry.lock().await.retain(|tag| !tags.contains(tag));
        }
    }

    /// Current tags of a file; empty for unknown paths.
    pub async fn get_tags(&self, file_path: &str) -> TagSet {
        match self.entry(file_path).await {
            Some(entry) => entry.lock().await.clone(),
            None => TagSet::new(),
        }
    }

    /// File paths carrying every one of `tags`, sorted.
    ///
    /// An empty query matches every known path.
    pub async fn find_by_tags<I, S>(&self, tags: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let wanted = normalize(tags);
        let snapshot: Vec<(String, Arc<Mutex<TagSet>>)> = self
            .entries
            .read()
            .await
            .iter()
            .map(|(path, entry)| (path.clone(), Arc::clone(entry)))
            .collect();

        let mut matches = Vec::new();
        for (path, entry) in snapshot {
            if entry.lock().await.is_superset(&wanted) {
                matches.push(path);
            }
        }
        matches.sort();
        matches
    }

    /// Number of known file paths.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether no file path is known.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn normalize<I, S>(tags: I) -> TagSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tags.into_iter()
        .map(|tag| tag.as_ref().trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tags: &[&str]) -> TagSet {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[tokio::test]
    async fn test_add_tags_unions() {
        let index = TagIndex::new();

        index.add_tags("p", ["a", "b"]).await;
        index.add_tags("p", ["b", "c"]).await;

        assert_eq!(index.get_tags("p").await, set(&["a", "b", "c"]));
    }

    #[tokio::test]
    async fn test_remove_tags_difference() {
        let index = TagIndex::new();

        index.add_tags("p", ["a", "b"]).await;
        index.remove_tags("p", ["a"]).await;

        assert_eq!(index.get_tags("p").await, set(&["b"]));
    }

    #[tokio::test]
    async fn test_remove_all_keeps_empty_entry() {
        let index = TagIndex::new();

        index.add_tags("p", ["a"]).await;
        index.remove_tags("p", ["a", "zzz"]).await;

        assert!(index.get_tags("p").await.is_empty());
        assert_eq!(index.len().await, 1);
    }

    #[tokio::test]
    async fn test_remove_from_unknown_path_is_noop() {
        let index = TagIndex::new();

        index.remove_tags("ghost", ["a"]).await;

        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn test_get_tags_unknown_path() {
        let index = TagIndex::new();
        assert!(index.get_tags("nowhere").await.is_empty());
    }

    #[tokio::test]
    async fn test_add_empty_set_creates_entry() {
        let index = TagIndex::new();

        index.add_tags("p", Vec::<String>::new()).await;

        assert_eq!(index.len().await, 1);
        assert!(index.get_tags("p").await.is_empty());
    }

    #[tokio::test]
    async fn test_tags_are_trimmed_and_blank_ignored() {
        let index = TagIndex::new();

        index.add_tags("p", [" a ", "", "   ", "a"]).await;

        assert_eq!(index.get_tags("p").await, set(&["a"]));
    }

    #[tokio::test]
    async fn test_auto_tag() {
        let index = TagIndex::new();

        index.auto_tag("/data/2024/report_final.csv").await;

        let tags = index.get_tags("/data/2024/report_final.csv").await;
        for expected in ["data", "2024", "report", "final", "csv"] {
            assert!(tags.contains(expected), "missing {expected}");
        }
    }

    #[tokio::test]
    async fn test_auto_tag_merges_with_manual_tags() {
        let index = TagIndex::new();

        index.add_tags("/data/x.txt", ["important"]).await;
        index.auto_tag("/data/x.txt").await;

        let tags = index.get_tags("/data/x.txt").await;
        assert!(tags.contains("important"));
        assert!(tags.contains("data"));
    }

    #[tokio::test]
    async fn test_find_by_tags() {
        let index = TagIndex::new();
        index.add_tags("a.txt", ["red", "big"]).await;
        index.add_tags("b.txt", ["red"]).await;
        index.add_tags("c.txt", ["blue", "big"]).await;

        assert_eq!(index.find_by_tags(["red"]).await, vec!["a.txt", "b.txt"]);
        assert_eq!(index.find_by_tags(["red", "big"]).await, vec!["a.txt"]);
        assert!(index.find_by_tags(["green"]).await.is_empty());
        assert_eq!(index.find_by_tags(Vec::<String>::new()).await.len(), 3);
    }
}
