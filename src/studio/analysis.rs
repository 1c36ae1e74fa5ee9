// SPDX-License-Identifier: MIT

//! Deterministic text metrics used by the analysis and quality tools

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Overall score at or above which content is considered publishable
pub const QUALITY_THRESHOLD: f64 = 70.0;

static HASHTAG_CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-zA-Z]{4,}\b").expect("hashtag pattern is valid"));

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "been", "be",
        "have", "has", "had", "do", "does", "did", "will", "would", "could", "should", "may",
        "might", "must", "can", "of", "to", "for", "in", "with", "by", "from", "up", "about",
        "into", "through", "during", "and", "or", "but", "if", "then", "than", "so", "this",
        "that", "these", "those",
    ]
    .into_iter()
    .collect()
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readability {
    pub score: f64,
    pub grade: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityScore {
    pub overall_score: f64,
    pub word_count: i64,
    pub meets_threshold: bool,
}

/// Number of whitespace-separated tokens
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Vowel-group syllable estimate, never less than one
pub fn count_syllables(word: &str) -> usize {
    let word = word.to_lowercase();
    let mut count: isize = 0;
    let mut previous_was_vowel = false;

    for c in word.chars() {
        let is_vowel = "aeiouy".contains(c);
        if is_vowel && !previous_was_vowel {
            count += 1;
        }
        previous_was_vowel = is_vowel;
    }

    if word.ends_with('e') {
        count -= 1;
    }

    count.max(1) as usize
}

/// Flesch reading ease, clamped to 0..=100 and rounded to two decimals
pub fn calculate_readability_score(text: &str) -> Readability {
    let sentences = text.split('.').filter(|s| !s.trim().is_empty()).count();
    if sentences == 0 {
        return Readability {
            score: 0.0,
            grade: "Unable to calculate".to_string(),
        };
    }

    let words: Vec<&str> = text.split_whitespace().collect();
    let score = if words.is_empty() {
        0.0
    } else {
        let total_words = words.len() as f64;
        let syllables: usize = words.iter().map(|w| count_syllables(w)).sum();
        let raw = 206.835
            - 1.015 * (total_words / sentences as f64)
            - 84.6 * (syllables as f64 / total_words);
        raw.clamp(0.0, 100.0)
    };

    let grade = if score >= 60.0 {
        "Easy to read"
    } else if score >= 50.0 {
        "Moderate"
    } else {
        "Complex"
    };

    Readability {
        score: round2(score),
        grade: grade.to_string(),
    }
}

/// Most frequent non-stop-words of four or more letters, as `#Capitalized` tags.
///
/// Ties keep first-appearance order.
pub fn generate_hashtags(text: &str, count: usize) -> Vec<String> {
    let lowered = text.to_lowercase();

    let mut order: Vec<&str> = Vec::new();
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for m in HASHTAG_CANDIDATE.find_iter(&lowered) {
        let word = m.as_str();
        if STOP_WORDS.contains(word) {
            continue;
        }
        let seen = freq.entry(word).or_insert(0);
        if *seen == 0 {
            order.push(word);
        }
        *seen += 1;
    }

    // sort_by is stable
    order.sort_by(|a, b| freq[b].cmp(&freq[a]));

    order
        .into_iter()
        .take(count)
        .map(|w| format!("#{}", capitalize(w)))
        .collect()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Weighted blend of length, readability and structure
pub fn calculate_content_quality_score(
    word_count: i64,
    readability_score: f64,
    has_headings: bool,
    has_conclusion: bool,
) -> QualityScore {
    let word_score = if word_count < 500 {
        30.0
    } else if word_count < 800 {
        60.0
    } else if word_count <= 2000 {
        100.0
    } else {
        80.0
    };

    let read_score = if readability_score > 0.0 {
        (readability_score * 1.5).min(100.0)
    } else {
        40.0
    };

    let structure_score =
        if has_headings { 50.0 } else { 0.0 } + if has_conclusion { 50.0 } else { 0.0 };

    let overall = word_score * 0.3 + read_score * 0.3 + structure_score * 0.4;

    QualityScore {
        overall_score: round2(overall),
        word_count,
        meets_threshold: overall >= QUALITY_THRESHOLD,
    }
}

/// Round to 2 decimals, ties to even
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}
