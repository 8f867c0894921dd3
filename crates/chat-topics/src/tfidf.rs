//! TF-IDF (Term Frequency - Inverse Document Frequency) implementation.
//!
//! Two consumers share one tokenizer:
//! - `TfIdfVectorizer` turns group documents into sparse vectors for merging
//! - `TfIdf` ranks keywords for labeling
//!
//! Both use ordered maps so scores and rankings never depend on hash order.

use std::collections::{BTreeMap, BTreeSet};

use crate::similarity::SparseVector;

/// Tokenizer behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Drop common English stop words
    pub remove_stop_words: bool,
    /// Append adjacent-token bigrams
    pub bigrams: bool,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            remove_stop_words: true,
            bigrams: false,
        }
    }
}

/// Vectorizer behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VectorizerOptions {
    pub tokenizer: TokenizerOptions,
    /// Keep only the N most frequent terms
    pub max_features: Option<usize>,
}

/// Fitted TF-IDF vocabulary.
///
/// Weights are raw term counts times smoothed IDF, L2-normalised.
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    /// Term -> column index (alphabetical)
    vocabulary: BTreeMap<String, usize>,
    /// IDF per column
    idf: Vec<f32>,
    options: VectorizerOptions,
}

impl TfIdfVectorizer {
    /// Fit a vocabulary over `documents`.
    pub fn fit(documents: &[&str], options: VectorizerOptions) -> Self {
        let doc_count = documents.len();
        let mut doc_frequencies: BTreeMap<String, usize> = BTreeMap::new();
        let mut corpus_frequencies: BTreeMap<String, usize> = BTreeMap::new();

        for doc in documents {
            let terms = tokenize_with(doc, options.tokenizer);
            let unique: BTreeSet<&String> = terms.iter().collect();
            for term in unique {
                *doc_frequencies.entry(term.clone()).or_insert(0) += 1;
            }
            for term in terms {
                *corpus_frequencies.entry(term).or_insert(0) += 1;
            }
        }

        let mut kept: Vec<String> = match options.max_features {
            Some(limit) if corpus_frequencies.len() > limit => {
                let mut ranked: Vec<(&String, usize)> =
                    corpus_frequencies.iter().map(|(t, &c)| (t, c)).collect();
                // Most frequent first, ties alphabetical
                ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
                ranked.truncate(limit);
                ranked.into_iter().map(|(t, _)| t.clone()).collect()
            }
            _ => corpus_frequencies.into_keys().collect(),
        };
        kept.sort();

        let n = doc_count as f32;
        let idf = kept
            .iter()
            .map(|term| {
                let df = doc_frequencies.get(term).copied().unwrap_or(0) as f32;
                smoothed_idf(n, df)
            })
            .collect();
        let vocabulary = kept
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        Self {
            vocabulary,
            idf,
            options,
        }
    }

    /// Fit on `documents` and vectorize each of them.
    pub fn fit_transform(
        documents: &[&str],
        options: VectorizerOptions,
    ) -> (Self, Vec<SparseVector>) {
        let vectorizer = Self::fit(documents, options);
        let vectors = documents.iter().map(|d| vectorizer.transform(d)).collect();
        (vectorizer, vectors)
    }

    /// Vectorize a document against the fitted vocabulary.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f32> = BTreeMap::new();
        for term in tokenize_with(document, self.options.tokenizer) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let weights = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]));
        let mut vector = SparseVector::from_sorted(weights.collect());
        vector.normalize();
        vector
    }

    /// Number of terms in the vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

/// Keyword ranker over a small corpus.
///
/// Computes term importance based on frequency across the corpus and rarity
/// across documents.
pub struct TfIdf {
    /// Term -> document count (how many documents contain this term)
    doc_frequencies: BTreeMap<String, usize>,
    /// Term -> total frequency across all documents
    term_frequencies: BTreeMap<String, usize>,
    /// Sum of all term frequencies
    total_terms: usize,
    /// Number of documents
    doc_count: usize,
}

impl TfIdf {
    /// Create a ranker from a corpus of documents.
    pub fn new(documents: &[&str]) -> Self {
        let mut doc_frequencies: BTreeMap<String, usize> = BTreeMap::new();
        let mut term_frequencies: BTreeMap<String, usize> = BTreeMap::new();
        let mut total_terms = 0;

        for doc in documents {
            let terms = tokenize(doc);
            let unique_terms: BTreeSet<&String> = terms.iter().collect();

            for term in unique_terms {
                *doc_frequencies.entry(term.clone()).or_insert(0) += 1;
            }

            total_terms += terms.len();
            for term in terms {
                *term_frequencies.entry(term).or_insert(0) += 1;
            }
        }

        Self {
            doc_frequencies,
            term_frequencies,
            total_terms,
            doc_count: documents.len(),
        }
    }

    /// TF-IDF score for a term.
    ///
    /// TF is the term's share of all terms, IDF is smoothed:
    /// `ln((N + 1) / (df + 1)) + 1`.
    pub fn score(&self, term: &str) -> f32 {
        let df = self.doc_frequencies.get(term).copied().unwrap_or(0);
        if df == 0 || self.total_terms == 0 {
            return 0.0;
        }
        let count = self.term_frequencies.get(term).copied().unwrap_or(0) as f32;
        let tf = count / self.total_terms as f32;
        tf * smoothed_idf(self.doc_count as f32, df as f32)
    }

    /// Top N terms by score, highest first; ties alphabetical.
    pub fn top_terms(&self, n: usize) -> Vec<(String, f32)> {
        let mut scores: Vec<(String, f32)> = self
            .term_frequencies
            .keys()
            .map(|term| (term.clone(), self.score(term)))
            .filter(|(_, score)| *score > 0.0)
            .collect();

        scores.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        scores.truncate(n);
        scores
    }
}

fn smoothed_idf(doc_count: f32, doc_frequency: f32) -> f32 {
    ((doc_count + 1.0) / (doc_frequency + 1.0)).ln() + 1.0
}

/// Tokenize with default options (stop words removed, no bigrams).
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_with(text, TokenizerOptions::default())
}

/// Tokenize text into lowercase terms.
///
/// CJK ideographs become one token each since those scripts have no spaces.
/// Filters out:
/// - Stop words (when enabled)
/// - Single-byte tokens
/// - Numbers
pub fn tokenize_with(text: &str, options: TokenizerOptions) -> Vec<String> {
    let mut unigrams: Vec<String> = Vec::new();
    let lowered = text.to_lowercase();

    for word in lowered.split(|c: char| !c.is_alphanumeric()) {
        let mut run = String::new();
        for c in word.chars() {
            if is_cjk(c) {
                push_token(&mut unigrams, std::mem::take(&mut run), options);
                push_token(&mut unigrams, c.to_string(), options);
            } else {
                run.push(c);
            }
        }
        push_token(&mut unigrams, run, options);
    }

    if !options.bigrams || unigrams.len() < 2 {
        return unigrams;
    }

    let bigrams: Vec<String> = unigrams
        .windows(2)
        .map(|pair| format!("{} {}", pair[0], pair[1]))
        .collect();
    unigrams.extend(bigrams);
    unigrams
}

fn push_token(tokens: &mut Vec<String>, token: String, options: TokenizerOptions) {
    if token.len() <= 1 {
        return;
    }
    if token.chars().all(|c| c.is_numeric()) {
        return;
    }
    if options.remove_stop_words && is_stop_word(&token) {
        return;
    }
    tokens.push(token);
}

fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{30FF}'     // Hiragana, Katakana
        | '\u{3400}'..='\u{4DBF}'   // CJK Extension A
        | '\u{4E00}'..='\u{9FFF}'   // CJK Unified Ideographs
        | '\u{AC00}'..='\u{D7AF}'   // Hangul syllables
        | '\u{F900}'..='\u{FAFF}'   // CJK Compatibility Ideographs
    )
}

/// Check if a word is a stop word.
fn is_stop_word(word: &str) -> bool {
    const STOP_WORDS: &[&str] = &[
        "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is",
        "it", "its", "of", "on", "or", "that", "the", "to", "was", "were", "will", "with", "this",
        "they", "but", "have", "had", "what", "when", "where", "who", "which", "why", "how", "all",
        "each", "every", "both", "few", "more", "most", "other", "some", "such", "no", "nor",
        "not", "only", "own", "same", "so", "than", "too", "very", "can", "just", "should", "now",
        "also", "been", "being", "do", "does", "did", "doing", "would", "could", "might", "must",
        "shall", "about", "above", "after", "again", "against", "am", "any", "before", "below",
        "between", "into", "through", "during", "out", "over", "under", "up", "down", "then",
        "once", "here", "there", "if", "else", "while", "because", "until", "we", "you", "your",
        "our", "their", "him", "her", "them", "me", "my", "myself", "itself", "those", "these",
        "his", "im", "ok", "yes", "yeah", "lol",
    ];

    STOP_WORDS.contains(&word)
}
