//! Customer reviews and the gibberish filter applied to their comments.
//!
//! The filter is a heuristic. It catches keyboard mashing ("azertyuiop",
//! "zzzzzz", "qsdfghjk") but says nothing about whether a comment is genuine.
//! `y` is treated as a vowel only: it never extends a consonant run nor counts
//! towards the consonant ratio.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::config::{
    DEFAULT_REVIEW_MAX_CONSONANT_RATIO, DEFAULT_REVIEW_MAX_CONSONANT_RUN,
    DEFAULT_REVIEW_MAX_REPEAT, DEFAULT_REVIEW_MAX_SINGLE_WORD, DEFAULT_REVIEW_MIN_LENGTH,
    MAX_RATING, MIN_RATING,
};
use crate::errors::AppError;

static VOWELS: Lazy<Regex> =
    Lazy::new(|| Regex::new("[aeiouyàâäéèêëîïôöùûüÿœæ]").expect("vowel class is a valid regex"));

static CONSONANT_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new("[bcdfghjklmnpqrstvwxzç]+").expect("consonant class is a valid regex"));

/// A rating between 1 and 5 stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Rating(i32);

impl Rating {
    pub fn value(&self) -> i32 {
        self.0
    }

    /// Rebuild a stored rating, pulling out-of-range values back into bounds.
    pub(crate) fn clamped(value: i32) -> Self {
        Self(value.clamp(MIN_RATING, MAX_RATING))
    }
}

impl TryFrom<i32> for Rating {
    type Error = AppError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        if (MIN_RATING..=MAX_RATING).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AppError::field(
                "note",
                format!("La note doit être comprise entre {} et {}.", MIN_RATING, MAX_RATING),
            ))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub rating: Rating,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewDetails {
    #[serde(flatten)]
    pub review: Review,
    pub author: String,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub rating: i32,
    pub comment: String,
}

/// Thresholds of the comment filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewHeuristics {
    pub min_length: usize,
    pub max_consonant_run: usize,
    pub max_single_word: usize,
    pub max_repeat: usize,
    pub max_consonant_ratio: f64,
}

impl Default for ReviewHeuristics {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_REVIEW_MIN_LENGTH,
            max_consonant_run: DEFAULT_REVIEW_MAX_CONSONANT_RUN,
            max_single_word: DEFAULT_REVIEW_MAX_SINGLE_WORD,
            max_repeat: DEFAULT_REVIEW_MAX_REPEAT,
            max_consonant_ratio: DEFAULT_REVIEW_MAX_CONSONANT_RATIO,
        }
    }
}

/// Why a comment was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommentIssue {
    #[error("Le commentaire doit contenir au moins {0} caractères.")]
    TooShort(usize),

    #[error("Le commentaire ne contient aucune voyelle.")]
    NoVowel,

    #[error("Le commentaire contient trop de consonnes consécutives.")]
    ConsonantRun,

    #[error("Merci d'écrire une phrase plutôt qu'un seul mot.")]
    SingleWord,

    #[error("Le commentaire répète trop de fois le même caractère.")]
    RepeatedCharacter,

    #[error("Le commentaire ne ressemble pas à du texte.")]
    Unbalanced,
}

impl From<CommentIssue> for AppError {
    fn from(issue: CommentIssue) -> Self {
        AppError::field("commentaire", issue.to_string())
    }
}

/// Rejects comments that look like random keystrokes.
#[derive(Debug, Clone, Copy)]
pub struct CommentFilter {
    rules: ReviewHeuristics,
}

impl CommentFilter {
    pub fn new(rules: ReviewHeuristics) -> Self {
        Self { rules }
    }

    /// Check `comment`; the first failing rule is reported.
    pub fn check(&self, comment: &str) -> Result<(), CommentIssue> {
        let text = comment.trim().to_lowercase();
        let length = text.chars().count();

        if length < self.rules.min_length {
            return Err(CommentIssue::TooShort(self.rules.min_length));
        }

        let vowels = VOWELS.find_iter(&text).count();
        if vowels == 0 {
            return Err(CommentIssue::NoVowel);
        }

        let mut consonants = 0;
        for run in CONSONANT_RUNS.find_iter(&text) {
            let run_length = run.as_str().chars().count();
            if run_length > self.rules.max_consonant_run {
                return Err(CommentIssue::ConsonantRun);
            }
            consonants += run_length;
        }

        if !text.contains(char::is_whitespace) && length > self.rules.max_single_word {
            return Err(CommentIssue::SingleWord);
        }

        if longest_repeat(&text) > self.rules.max_repeat {
            return Err(CommentIssue::RepeatedCharacter);
        }

        if consonants as f64 / vowels as f64 > self.rules.max_consonant_ratio {
            return Err(CommentIssue::Unbalanced);
        }

        Ok(())
    }
}

impl Default for CommentFilter {
    fn default() -> Self {
        Self::new(ReviewHeuristics::default())
    }
}

/// Length of the longest run of one repeated character.
fn longest_repeat(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous = None;

    for c in text.chars() {
        if Some(c) == previous {
            current += 1;
        } else {
            current = 1;
            previous = Some(c);
        }
        longest = longest.max(current);
    }

    longest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(comment: &str) -> Result<(), CommentIssue> {
        CommentFilter::default().check(comment)
    }

    #[test]
    fn test_genuine_comments_accepted() {
        assert_eq!(check("Très bon restaurant, je recommande !"), Ok(()));
        assert_eq!(check("Service rapide et plats généreux."), Ok(()));
        assert_eq!(check("  Parfait !  "), Ok(()));
    }

    #[test]
    fn test_short_comment_rejected() {
        assert_eq!(check("Top"), Err(CommentIssue::TooShort(5)));
        assert_eq!(check("   ok    "), Err(CommentIssue::TooShort(5)));
    }

    #[test]
    fn test_no_vowel_rejected() {
        assert_eq!(check("bcdf ghjk"), Err(CommentIssue::NoVowel));
    }

    #[test]
    fn test_consonant_run_rejected() {
        assert_eq!(check("super qsdfg bon"), Err(CommentIssue::ConsonantRun));
    }

    #[test]
    fn test_long_single_word_rejected() {
        assert_eq!(check("azertyuiop"), Err(CommentIssue::SingleWord));
        assert_eq!(check("Délice"), Ok(()));
    }

    #[test]
    fn test_repeated_characters_rejected() {
        assert_eq!(check("trop bien !!!!"), Err(CommentIssue::RepeatedCharacter));
        assert_eq!(check("miam miam aaaa"), Err(CommentIssue::RepeatedCharacter));
        assert_eq!(check("ouah !!! super"), Ok(()));
    }

    #[test]
    fn test_consonant_heavy_text_rejected() {
        assert_eq!(check("pst pst pst a"), Err(CommentIssue::Unbalanced));
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let lenient = CommentFilter::new(ReviewHeuristics {
            min_length: 2,
            ..ReviewHeuristics::default()
        });

        assert_eq!(lenient.check("Top"), Ok(()));
    }

    #[test]
    fn test_rating_bounds() {
        assert!(Rating::try_from(1).is_ok());
        assert!(Rating::try_from(5).is_ok());
        assert!(Rating::try_from(0).is_err());
        assert!(Rating::try_from(6).is_err());
    }

    #[test]
    fn test_longest_repeat() {
        assert_eq!(longest_repeat(""), 0);
        assert_eq!(longest_repeat("abc"), 1);
        assert_eq!(longest_repeat("abbbc"), 3);
    }
}
