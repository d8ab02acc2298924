use std::collections::BTreeSet;

use crate::detect::result::Detection;
use crate::error::ConfigError;

/// Fixed set of labels of interest, configured at startup and immutable for
/// the process lifetime. Matching is case-insensitive.
#[derive(Clone, Debug)]
pub struct WatchList {
    labels: BTreeSet<String>,
}

impl WatchList {
    /// Build from configured labels. Labels are trimmed and lowercased;
    /// an empty result is a configuration error.
    pub fn new<I, S>(labels: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels: BTreeSet<String> = labels
            .into_iter()
            .map(|label| label.as_ref().trim().to_lowercase())
            .filter(|label| !label.is_empty())
            .collect();
        if labels.is_empty() {
            return Err(ConfigError::EmptyWatchList);
        }
        Ok(Self { labels })
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(&label.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels to watch, in sorted order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Filter detections against the watch-list and return the matched
    /// labels, sorted and distinct. Detections below `min_confidence` are
    /// ignored.
    pub fn matched_labels(&self, detections: &[Detection], min_confidence: f32) -> Vec<String> {
        detections
            .iter()
            .filter(|det| det.confidence >= min_confidence)
            .map(|det| det.label.trim().to_lowercase())
            .filter(|label| self.labels.contains(label))
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::result::BoundingBox;

    fn det(label: &str, confidence: f32) -> Detection {
        Detection::new(label, confidence, BoundingBox::default())
    }

    #[test]
    fn rejects_empty_watch_list() {
        assert!(WatchList::new(Vec::<String>::new()).is_err());
        assert!(WatchList::new(["  ", ""]).is_err());
    }

    #[test]
    fn matching_is_case_insensitive_sorted_and_distinct() {
        let watch = WatchList::new(["Dog", "cat"]).unwrap();
        let detections = vec![
            det("person", 0.99),
            det("DOG", 0.8),
            det("cat", 0.7),
            det("dog", 0.9),
        ];
        assert_eq!(watch.matched_labels(&detections, 0.5), vec!["cat", "dog"]);
    }

    #[test]
    fn low_confidence_detections_are_ignored() {
        let watch = WatchList::new(["cat"]).unwrap();
        let detections = vec![det("cat", 0.3)];
        assert!(watch.matched_labels(&detections, 0.5).is_empty());
    }

    #[test]
    fn non_watched_labels_never_match() {
        let watch = WatchList::new(["cat", "dog"]).unwrap();
        let detections = vec![det("person", 0.99), det("car", 0.95)];
        assert!(watch.matched_labels(&detections, 0.5).is_empty());
    }
}
