//! Derivation of display projects from raw repository records.
//!
//! The transformer filters out repositories that are not worth showing
//! (forks, archived, no description), humanizes the repository name into a
//! title, and derives a small tag list. Results are memoized per distinct
//! repository set so repeated renders of the same list are free.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::constants::{FALLBACK_TAG, MAX_TOPIC_TAGS, UNKNOWN_LANGUAGE};
use crate::github::Repository;

/// A showcase-ready project derived from one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub link: String,
    pub stars: u32,
    pub language: String,
    pub fork: bool,
}

/// Turn a repository slug into a display title.
///
/// Hyphens and underscores become spaces and every word is capitalized:
/// "my-cool-project" becomes "My Cool Project".
pub fn humanize_repo_name(name: &str) -> String {
    name.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Derive the tag list for a repository: the primary language first, then up
/// to three topics as given. Falls back to a single generic tag when the
/// repository has neither.
pub fn derive_tags(repo: &Repository) -> Vec<String> {
    let mut tags = Vec::with_capacity(1 + MAX_TOPIC_TAGS);

    if let Some(language) = &repo.language {
        tags.push(language.clone());
    }

    for topic in repo.topics.iter().take(MAX_TOPIC_TAGS) {
        tags.push(topic.clone());
    }

    if tags.is_empty() {
        tags.push(FALLBACK_TAG.to_string());
    }

    tags
}

fn showable(repo: &Repository) -> bool {
    if repo.fork || repo.archived {
        return false;
    }
    matches!(&repo.description, Some(d) if !d.trim().is_empty())
}

/// Memoizing repository-to-project transformer.
///
/// The memo key is the sorted repository id set, so the same list fetched
/// twice (or re-ordered by the caller) reuses the previous derivation. Name
/// humanization is cached separately since slugs repeat across fetches.
pub struct ProjectTransformer {
    memo: Mutex<HashMap<String, Arc<Vec<Project>>>>,
    names: Mutex<HashMap<String, String>>,
}

impl ProjectTransformer {
    pub fn new() -> Self {
        Self {
            memo: Mutex::new(HashMap::new()),
            names: Mutex::new(HashMap::new()),
        }
    }

    fn memo_key(repos: &[Repository]) -> String {
        let mut ids: Vec<u64> = repos.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn title_for(&self, name: &str) -> String {
        let mut names = self.names.lock();
        names
            .entry(name.to_string())
            .or_insert_with(|| humanize_repo_name(name))
            .clone()
    }

    fn to_project(&self, repo: &Repository) -> Project {
        Project {
            id: repo.id,
            title: self.title_for(&repo.name),
            description: repo
                .description
                .clone()
                .unwrap_or_default()
                .trim()
                .to_string(),
            tags: derive_tags(repo),
            link: repo.html_url.clone(),
            stars: repo.stargazers_count,
            language: repo
                .language
                .clone()
                .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string()),
            fork: repo.fork,
        }
    }

    pub fn transform(&self, repos: &[Repository]) -> Arc<Vec<Project>> {
        let key = Self::memo_key(repos);

        if let Some(cached) = self.memo.lock().get(&key) {
            return Arc::clone(cached);
        }

        let projects: Arc<Vec<Project>> = Arc::new(
            repos
                .iter()
                .filter(|r| showable(r))
                .map(|r| self.to_project(r))
                .collect(),
        );

        self.memo.lock().insert(key, Arc::clone(&projects));
        projects
    }

    pub fn clear(&self) {
        self.memo.lock().clear();
        self.names.lock().clear();
    }
}

impl Default for ProjectTransformer {
    fn default() -> Self {
        Self::new()
    }
}
