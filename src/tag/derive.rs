//! Automatic tag derivation from file paths.

use std::path::{Component, Path};

use super::index::TagSet;

/// Tags for a file path: every path segment plus every word of the file name.
///
/// Words are maximal runs of alphanumeric characters, so `report_final.csv`
/// yields `report`, `final` and `csv`.
pub fn auto_tags(file_path: &str) -> TagSet {
    let path = Path::new(file_path);
    let mut tags: TagSet = path
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if let Some(name) = path.file_name() {
        tags.extend(words(&name.to_string_lossy()));
    }

    tags
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_string)
}
