//! Tag post-processor: exclusion rules and weight ordering.

use std::cmp::Reverse;

use crate::config::{TagExclude, TagWeight};
use crate::models::{Tag, Tagged};

/// Shared matching logic of weight and exclude rules.
pub trait TagRule {
    fn names(&self) -> &[String];
    fn rule_namespace(&self) -> Option<&str>;
    fn ignore_case(&self) -> bool;

    /// - names + namespace: namespace equal and name in the set
    /// - names only: name in the set (any namespace)
    /// - namespace only: every tag in the namespace
    /// - neither: never matches
    fn matches(&self, tag: &Tag) -> bool {
        let namespace = self.rule_namespace().filter(|ns| !ns.is_empty());
        if self.names().is_empty() {
            return namespace.is_some_and(|ns| ns == tag.namespace);
        }
        if namespace.is_some_and(|ns| ns != tag.namespace) {
            return false;
        }
        if self.ignore_case() {
            let name = tag.name.to_lowercase();
            self.names().iter().any(|n| n.to_lowercase() == name)
        } else {
            self.names().iter().any(|n| *n == tag.name)
        }
    }
}

impl TagRule for TagWeight {
    fn names(&self) -> &[String] {
        &self.names
    }

    fn rule_namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn ignore_case(&self) -> bool {
        self.ignore_case
    }
}

impl TagRule for TagExclude {
    fn names(&self) -> &[String] {
        &self.names
    }

    fn rule_namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn ignore_case(&self) -> bool {
        self.ignore_case
    }
}

pub fn is_excluded(tag: &Tag, excludes: &[TagExclude]) -> bool {
    excludes.iter().any(|rule| rule.matches(tag))
}

/// Weight of the first matching rule, 0 when none match.
pub fn tag_weight(tag: &Tag, weights: &[TagWeight]) -> i32 {
    weights
        .iter()
        .find(|rule| rule.matches(tag))
        .map_or(0, |rule| rule.weight)
}

/// Drop excluded tags, then stably sort the rest by descending weight.
pub fn process_tags(tags: Vec<Tag>, excludes: &[TagExclude], weights: &[TagWeight]) -> Vec<Tag> {
    let mut weighted: Vec<(i32, Tag)> = tags
        .into_iter()
        .filter(|tag| !is_excluded(tag, excludes))
        .map(|tag| (tag_weight(&tag, weights), tag))
        .collect();
    weighted.sort_by_key(|(weight, _)| Reverse(*weight));
    weighted.into_iter().map(|(_, tag)| tag).collect()
}

/// Apply [`process_tags`] to every record in place.
pub fn process_records<T: Tagged>(records: &mut [T], excludes: &[TagExclude], weights: &[TagWeight]) {
    for record in records {
        let tags = std::mem::take(record.tags_mut());
        *record.tags_mut() = process_tags(tags, excludes, weights);
    }
}
