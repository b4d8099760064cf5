//! Word-space config record.
//!
//! Every store carries a `disco.config` properties file (`key=value` lines)
//! written by the offline builder. The engine parses it into a typed
//! [`Config`]; unknown keys are ignored so configs from newer builders still
//! open, and missing optional keys fall back to the defaults documented on
//! each field.

use std::fmt;
use std::fs;
use std::path::Path;

use wordspace_vectors::Measure;

use crate::error::{SpaceError, SpaceResult};

/// File name of the config record inside a store.
pub const CONFIG_FILE_NAME: &str = "disco.config";

/// Content kind of a word space: vectors only, or vectors plus precomputed
/// nearest neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpaceKind {
    /// Vectors only; neighbour queries are rejected.
    Col,
    /// Vectors plus a stored neighbour list per word.
    Sim,
}

impl fmt::Display for SpaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpaceKind::Col => write!(f, "COL"),
            SpaceKind::Sim => write!(f, "SIM"),
        }
    }
}

/// Parsed metadata describing a word space.
///
/// Numeric fields default to 0, booleans to `false`, strings to empty,
/// except where noted. The builder-side keys the engine never interprets
/// (context windows, tag markers, token filters) are retained verbatim so a
/// config can be round-tripped.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    pub input_file_format: String,
    pub lemma: bool,
    pub lemma_features: bool,
    pub boundary_marks: bool,
    pub stopword_file: String,
    /// Space-separated stopword list from the `stopwords` key.
    pub stopwords: Vec<String>,
    /// Minimum corpus frequency over the vocabulary. Default 1.
    pub min_freq: u64,
    /// Maximum corpus frequency over the vocabulary. Default 1.
    pub max_freq: u64,
    /// Corpus size in tokens. Default 1.
    pub token_count: u64,
    pub vocabulary_size: u64,
    pub left_context: u32,
    pub right_context: u32,
    pub position: bool,
    pub opening_tag: String,
    pub closing_tag: String,
    pub word_by_document: bool,
    pub add_inverse_relations: bool,
    /// Feature dimensionality `D`.
    pub number_feature_words: u32,
    /// Stored neighbours per word (`nSim`); the width of the neighbour
    /// matrices in a SIM space.
    pub number_of_similar_words: u32,
    /// Size of the character n-gram table, 0 when absent.
    pub number_of_ngrams: u64,
    /// Smallest n-gram length; 0 when the store has no subword table.
    pub min_ngram: u32,
    /// Largest n-gram length; 0 when the store has no subword table.
    pub max_ngram: u32,
    pub weighting_method: String,
    pub min_weight: f32,
    /// Measure the neighbour lists were built with. Default COSINE.
    pub similarity_measure: Measure,
    /// `true` means the builder skipped second-order data: the space is COL.
    /// Default `true`.
    pub dont_compute_2nd_order: bool,
    pub disco_version: String,
    pub token_filter: String,
    pub multi_token_words_dictionary: String,
    pub token_annotator_map: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            input_file_format: String::new(),
            lemma: false,
            lemma_features: false,
            boundary_marks: false,
            stopword_file: String::new(),
            stopwords: Vec::new(),
            min_freq: 1,
            max_freq: 1,
            token_count: 1,
            vocabulary_size: 0,
            left_context: 0,
            right_context: 0,
            position: false,
            opening_tag: String::new(),
            closing_tag: String::new(),
            word_by_document: false,
            add_inverse_relations: false,
            number_feature_words: 0,
            number_of_similar_words: 0,
            number_of_ngrams: 0,
            min_ngram: 0,
            max_ngram: 0,
            weighting_method: String::new(),
            min_weight: 0.0,
            similarity_measure: Measure::Cosine,
            dont_compute_2nd_order: true,
            disco_version: String::new(),
            token_filter: String::new(),
            multi_token_words_dictionary: String::new(),
            token_annotator_map: String::new(),
        }
    }
}

impl Config {
    /// Parse a config record from `key=value` text.
    ///
    /// Lines starting with `#` and blank lines are skipped. A line without
    /// `=` or with an unparsable numeric value is [`SpaceError::CorruptConfig`].
    /// Unknown keys are ignored.
    pub fn parse(text: &str) -> SpaceResult<Config> {
        let mut config = Config::default();

        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (key, value) = line.split_once('=').ok_or_else(|| SpaceError::CorruptConfig {
                message: format!("line {}: missing '=' in '{}'", line_no + 1, line),
            })?;
            let key = key.trim();
            let value = value.trim();
            config.apply(key, value).map_err(|detail| SpaceError::CorruptConfig {
                message: format!("line {}: key '{}': {}", line_no + 1, key, detail),
            })?;
        }
        Ok(config)
    }

    /// Read and parse the config file of a store directory or an explicit
    /// file path.
    pub fn from_file(path: &Path) -> SpaceResult<Config> {
        let text = fs::read_to_string(path)?;
        Config::parse(&text)
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), String> {
        fn num<T: std::str::FromStr>(value: &str) -> Result<T, String> {
            value.parse::<T>().map_err(|_| format!("invalid number '{}'", value))
        }

        match key {
            "inputFileFormat" => self.input_file_format = value.to_string(),
            "lemma" => self.lemma = parse_bool(value),
            "lemmaFeatures" => self.lemma_features = parse_bool(value),
            "boundaryMarks" => self.boundary_marks = parse_bool(value),
            "stopwordFile" => self.stopword_file = value.to_string(),
            "stopwords" => {
                self.stopwords = value.split_whitespace().map(str::to_string).collect();
            }
            "minFreq" => self.min_freq = num(value)?,
            "maxFreq" => self.max_freq = num(value)?,
            "tokencount" => self.token_count = num(value)?,
            "vocabularySize" => self.vocabulary_size = num(value)?,
            "leftContext" => self.left_context = num(value)?,
            "rightContext" => self.right_context = num(value)?,
            "position" => self.position = parse_bool(value),
            "openingTag" => self.opening_tag = value.to_string(),
            "closingTag" => self.closing_tag = value.to_string(),
            "wordByDocument" => self.word_by_document = parse_bool(value),
            "addInverseRelations" => self.add_inverse_relations = parse_bool(value),
            "numberFeatureWords" => self.number_feature_words = num(value)?,
            "numberOfSimilarWords" => self.number_of_similar_words = num(value)?,
            "numberOfNgrams" => self.number_of_ngrams = num(value)?,
            "minNgram" => self.min_ngram = num(value)?,
            "maxNgram" => self.max_ngram = num(value)?,
            "weightingMethod" => self.weighting_method = value.to_string(),
            "minWeight" => self.min_weight = num(value)?,
            "similarityMeasure" => self.similarity_measure = value.parse::<Measure>()?,
            "dontCompute2ndOrder" => self.dont_compute_2nd_order = parse_bool(value),
            "discoVersion" => self.disco_version = value.to_string(),
            "tokenFilter" => self.token_filter = value.to_string(),
            "multiTokenWordsDictionary" => self.multi_token_words_dictionary = value.to_string(),
            "tokenAnnotatorMap" => self.token_annotator_map = value.to_string(),
            // Unknown keys are ignored so newer builder configs still open.
            _ => {}
        }
        Ok(())
    }

    /// Content kind derived from `dontCompute2ndOrder`.
    pub fn kind(&self) -> SpaceKind {
        if self.dont_compute_2nd_order {
            SpaceKind::Col
        } else {
            SpaceKind::Sim
        }
    }

    /// Whether the word is in the stopword list. Stopword lists are short,
    /// so this is a linear scan.
    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.iter().any(|s| s == word)
    }

    /// Whether the store carries a character n-gram table.
    pub fn has_ngrams(&self) -> bool {
        self.min_ngram > 0 && self.max_ngram >= self.min_ngram
    }

    /// Render the record back to `key=value` text.
    ///
    /// Emits every key, including defaults, in a fixed order; `parse` of the
    /// result reproduces this config.
    pub fn to_properties(&self) -> String {
        let mut out = String::new();
        let mut push = |key: &str, value: String| {
            out.push_str(key);
            out.push('=');
            out.push_str(&value);
            out.push('\n');
        };

        push("inputFileFormat", self.input_file_format.clone());
        push("lemma", self.lemma.to_string());
        push("lemmaFeatures", self.lemma_features.to_string());
        push("boundaryMarks", self.boundary_marks.to_string());
        push("stopwordFile", self.stopword_file.clone());
        push("stopwords", self.stopwords.join(" "));
        push("minFreq", self.min_freq.to_string());
        push("maxFreq", self.max_freq.to_string());
        push("tokencount", self.token_count.to_string());
        push("vocabularySize", self.vocabulary_size.to_string());
        push("leftContext", self.left_context.to_string());
        push("rightContext", self.right_context.to_string());
        push("position", self.position.to_string());
        push("openingTag", self.opening_tag.clone());
        push("closingTag", self.closing_tag.clone());
        push("wordByDocument", self.word_by_document.to_string());
        push("addInverseRelations", self.add_inverse_relations.to_string());
        push("numberFeatureWords", self.number_feature_words.to_string());
        push("numberOfSimilarWords", self.number_of_similar_words.to_string());
        push("numberOfNgrams", self.number_of_ngrams.to_string());
        push("minNgram", self.min_ngram.to_string());
        push("maxNgram", self.max_ngram.to_string());
        push("weightingMethod", self.weighting_method.clone());
        push("minWeight", self.min_weight.to_string());
        push("similarityMeasure", self.similarity_measure.to_string());
        push("dontCompute2ndOrder", self.dont_compute_2nd_order.to_string());
        push("discoVersion", self.disco_version.clone());
        push("tokenFilter", self.token_filter.clone());
        push("multiTokenWordsDictionary", self.multi_token_words_dictionary.clone());
        push("tokenAnnotatorMap", self.token_annotator_map.clone());
        out
    }
}

fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}
