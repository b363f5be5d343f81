use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;
use regex::Regex;
use crate::models::restaurant::RestaurantRecord;

pub const MAX_FEATURES: usize = 5000;

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything",
    "anyway", "anywhere", "are", "around", "as", "at", "back", "be", "became", "because",
    "become", "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below",
    "beside", "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call",
    "can", "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail",
    "do", "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
    "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together",
    "too", "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up",
    "upon", "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when",
    "whence", "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon",
    "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole", "whom",
    "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

fn token_pattern() -> &'static Regex {
    static TOKEN_PATTERN: OnceLock<Regex> = OnceLock::new();
    TOKEN_PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"))
}

fn stop_words() -> &'static HashSet<&'static str> {
    static STOP_WORD_SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    STOP_WORD_SET.get_or_init(|| STOP_WORDS.iter().copied().collect())
}

/// Lower-cased unigrams of two or more word characters with stop words removed,
/// followed by the bigrams of adjacent remaining unigrams.
pub fn analyze(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let unigrams: Vec<&str> = token_pattern()
        .find_iter(&lowered)
        .map(|token| token.as_str())
        .filter(|token| !stop_words().contains(token))
        .collect();

    let mut terms: Vec<String> = unigrams.iter().map(|token| token.to_string()).collect();
    terms.extend(unigrams.windows(2).map(|pair| format!("{} {}", pair[0], pair[1])));
    terms
}

/// L2-normalized sparse vector, entries sorted by term index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cosine similarity, a plain dot product since both sides are normalized.
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j, mut sum) = (0, 0, 0.0);
        while i < self.entries.len() && j < other.entries.len() {
            let (left_index, left_weight) = self.entries[i];
            let (right_index, right_weight) = other.entries[j];
            if left_index == right_index {
                sum += left_weight * right_weight;
                i += 1;
                j += 1;
            } else if left_index < right_index {
                i += 1;
            } else {
                j += 1;
            }
        }
        sum
    }
}

#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

impl TfIdfVectorizer {
    /// Fits vocabulary and smoothed idf weights over the whole corpus. The
    /// vocabulary keeps the `max_features` most frequent terms.
    pub fn fit<S: AsRef<str>>(documents: &[S], max_features: usize) -> Self {
        let mut term_counts: HashMap<String, usize> = HashMap::new();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for document in documents {
            let terms = analyze(document.as_ref());
            let mut seen: HashSet<&str> = HashSet::new();
            for term in &terms {
                *term_counts.entry(term.clone()).or_insert(0) += 1;
                if seen.insert(term.as_str()) {
                    *document_frequency.entry(term.clone()).or_insert(0) += 1;
                }
            }
        }

        let mut ranked: Vec<(String, usize)> = term_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);
        ranked.sort_by(|a, b| a.0.cmp(&b.0));

        let corpus_size = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(ranked.len());
        let mut idf = Vec::with_capacity(ranked.len());
        for (index, (term, _)) in ranked.into_iter().enumerate() {
            let df = document_frequency.get(&term).copied().unwrap_or(0) as f64;
            idf.push(((1.0 + corpus_size) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Self { vocabulary, idf }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in analyze(document) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();

        let norm = entries.iter().map(|(_, weight)| weight * weight).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in entries.iter_mut() {
                *weight /= norm;
            }
        }

        SparseVector { entries }
    }
}

/// Content similarity over one snapshot. Fitted once per corpus, so it has to be
/// rebuilt together with the records it was fitted on.
#[derive(Debug, Clone)]
pub struct SimilarityIndex {
    vectorizer: TfIdfVectorizer,
    vectors: Vec<SparseVector>,
}

impl SimilarityIndex {
    pub fn fit(records: &[RestaurantRecord]) -> Self {
        let documents: Vec<String> = records.iter().map(RestaurantRecord::similarity_text).collect();
        let vectorizer = TfIdfVectorizer::fit(&documents, MAX_FEATURES);
        let vectors = documents
            .iter()
            .map(|document| vectorizer.transform(document))
            .collect();

        Self { vectorizer, vectors }
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }

    /// The `n` positions most similar to `position`, excluding itself, highest
    /// similarity first and ties in corpus order. `None` for an unknown position.
    pub fn most_similar(&self, position: usize, n: usize) -> Option<Vec<(usize, f64)>> {
        let target = self.vectors.get(position)?;

        let mut scored: Vec<(usize, f64)> = self
            .vectors
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != position)
            .map(|(other, vector)| (other, target.cosine(vector)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(n);
        Some(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::restaurant::fixtures::record;

    fn restaurant(id: usize, name: &str, cuisine: &str, description: &str) -> RestaurantRecord {
        let mut record = record(id, name);
        record.cuisine = cuisine.to_string();
        record.description = description.to_string();
        record
    }

    fn corpus() -> Vec<RestaurantRecord> {
        vec![
            restaurant(0, "Sushi Ya", "Japanese, Sushi", "Omakase sushi counter with seasonal fish"),
            restaurant(1, "Pasta Bar", "Italian", "Handmade pasta and Italian wines"),
            restaurant(2, "Sushi Kan", "Japanese, Sushi", "Traditional sushi and seasonal fish"),
            restaurant(3, "Trattoria Roma", "Italian", "Roman pasta classics"),
        ]
    }

    #[test]
    fn analyze_drops_stop_words_and_short_tokens() {
        let terms = analyze("The sushi is a delight");
        assert_eq!(terms, vec!["sushi", "delight", "sushi delight"]);
    }

    #[test]
    fn analyze_drops_common_english_stop_words() {
        let terms = analyze("Maison de Tokyo, first two floors, full menu made to find");
        assert_eq!(
            terms,
            vec!["maison", "tokyo", "floors", "menu", "maison tokyo", "tokyo floors", "floors menu"]
        );
    }

    #[test]
    fn transformed_vectors_are_unit_length() {
        let vectorizer = TfIdfVectorizer::fit(&["sushi counter", "pasta bar", "sushi bar"], MAX_FEATURES);
        let vector = vectorizer.transform("sushi bar sushi");

        let self_similarity = vector.cosine(&vector);
        assert!((self_similarity - 1.0).abs() < 1e-9);
    }

    #[test]
    fn vocabulary_is_capped_by_frequency() {
        let vectorizer = TfIdfVectorizer::fit(&["alpha alpha beta", "alpha gamma"], 1);
        assert_eq!(vectorizer.vocabulary_size(), 1);
        assert!(!vectorizer.transform("alpha").is_empty());
        assert!(vectorizer.transform("beta").is_empty());
    }

    #[test]
    fn most_similar_prefers_shared_vocabulary() {
        let index = SimilarityIndex::fit(&corpus());

        let similar = index.most_similar(0, 1).unwrap();
        assert_eq!(similar[0].0, 2);

        let similar = index.most_similar(1, 1).unwrap();
        assert_eq!(similar[0].0, 3);
    }

    #[test]
    fn most_similar_never_returns_the_target() {
        let index = SimilarityIndex::fit(&corpus());
        for position in 0..index.len() {
            let similar = index.most_similar(position, 10).unwrap();
            assert_eq!(similar.len(), index.len() - 1);
            assert!(similar.iter().all(|(other, _)| *other != position));
        }
    }

    #[test]
    fn unknown_position_is_none() {
        let index = SimilarityIndex::fit(&corpus());
        assert!(index.most_similar(42, 3).is_none());
    }

    #[test]
    fn unrelated_records_tie_in_corpus_order() {
        let records = vec![
            restaurant(0, "Alpha", "", ""),
            restaurant(1, "Beta", "", ""),
            restaurant(2, "Gamma", "", ""),
        ];
        let index = SimilarityIndex::fit(&records);

        let similar = index.most_similar(2, 2).unwrap();
        assert_eq!(similar, vec![(0, 0.0), (1, 0.0)]);
    }
}
