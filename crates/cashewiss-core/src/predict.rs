//! Fallback category prediction for labels missing from the mapping tables
//!
//! Predictors only ever return a bare [`Category`]; picking a subcategory is
//! left to explicit table entries.

use crate::taxonomy::{Category, Subcategory};

/// Predicts a category from free text. Must not panic and must be side-effect free.
pub trait CategoryPredictor: Send + Sync {
    fn predict(&self, text: &str) -> Option<Category>;

    /// Name used in log output
    fn name(&self) -> &str {
        "predictor"
    }
}

/// Provider category labels and legacy Cashew category names that do not
/// match a current category or subcategory name
const KEYWORDS: &[(&str, Category)] = &[
    ("salary", Category::Income),
    ("lohn", Category::Income),
    ("gehalt", Category::Income),
    ("bills & fees", Category::Bills),
    ("insurance", Category::Bills),
    ("telecommunication service", Category::Bills),
    ("school", Category::Bills),
    ("auto", Category::Essentials),
    ("supermarket", Category::Essentials),
    ("public transport", Category::Essentials),
    ("taxi", Category::Essentials),
    ("food and drink", Category::Dining),
    ("restaurant", Category::Dining),
    ("bakery", Category::Dining),
    ("canteen", Category::Dining),
    ("fast food restaurant", Category::Dining),
    ("friends & co", Category::Dining),
    ("clothes", Category::Shopping),
    ("games", Category::Shopping),
    ("book shop", Category::Shopping),
    ("house", Category::Household),
    ("family and household", Category::Household),
    ("beauty & health", Category::PersonalCare),
    ("health and beauty", Category::PersonalCare),
    ("health", Category::PersonalCare),
    ("beauty", Category::PersonalCare),
    ("hairdresser", Category::PersonalCare),
    ("pharmacy", Category::PersonalCare),
    ("entertainment", Category::Leisure),
    ("concerts", Category::Leisure),
    ("leisure activities", Category::Leisure),
    ("amusement park", Category::Leisure),
    ("sport", Category::Hobbies),
    ("hotel", Category::Travel),
    ("lodging", Category::Travel),
];

/// Matches text against a vocabulary of category labels, first exactly and
/// then by normalized Levenshtein similarity
#[derive(Debug, Clone)]
pub struct SimilarityPredictor {
    vocabulary: Vec<(String, Category)>,
    threshold: f64,
}

impl Default for SimilarityPredictor {
    fn default() -> Self {
        Self::new()
    }
}

impl SimilarityPredictor {
    pub const DEFAULT_THRESHOLD: f64 = 0.85;

    /// Vocabulary: category names, subcategory names and the built-in keywords
    pub fn new() -> Self {
        let mut vocabulary = Vec::new();
        for category in Category::ALL {
            vocabulary.push((normalize(category.as_str()), category));
        }
        for category in Category::ALL {
            for sub in category.subcategories() {
                // "Twint" belongs to two categories, so it predicts nothing
                if Subcategory::twint(category) == Some(*sub) {
                    continue;
                }
                vocabulary.push((normalize(sub.as_str()), category));
            }
        }
        for (keyword, category) in KEYWORDS {
            vocabulary.push((normalize(keyword), *category));
        }

        Self {
            vocabulary,
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }

    /// Minimum similarity (0.0..=1.0) for a fuzzy match
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Add extra labels to the vocabulary (appended after the built-ins)
    pub fn with_keywords<'a, I>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, Category)>,
    {
        self.vocabulary
            .extend(keywords.into_iter().map(|(k, c)| (normalize(k), c)));
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

impl CategoryPredictor for SimilarityPredictor {
    fn predict(&self, text: &str) -> Option<Category> {
        let input = normalize(text);
        if input.is_empty() {
            return None;
        }

        if let Some((_, category)) = self.vocabulary.iter().find(|(label, _)| *label == input) {
            return Some(*category);
        }

        // Best score wins; on ties the earlier vocabulary entry is kept
        let mut best: Option<(f64, &str, Category)> = None;
        for (label, category) in &self.vocabulary {
            let score = strsim::normalized_levenshtein(&input, label);
            if score >= self.threshold && best.map_or(true, |(top, _, _)| score > top) {
                best = Some((score, label.as_str(), *category));
            }
        }

        match best {
            Some((score, label, category)) => {
                tracing::debug!(
                    "Fuzzy matched '{}' to '{}' ({:.2}): {}",
                    text,
                    label,
                    score,
                    category
                );
                Some(category)
            }
            None => None,
        }
    }

    fn name(&self) -> &str {
        "similarity"
    }
}

/// Lowercase, turn punctuation other than `&` into spaces, collapse whitespace
fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '&' { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
