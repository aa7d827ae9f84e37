//! Text canonicalization shared by every stage of the pipeline.
//!
//! Every comparison in this crate happens over the output of [`tokenize`]:
//! lower-cased, punctuation-free tokens with optional stop-word removal.
//! Token sets are `BTreeSet`s so iteration order, and therefore the
//! canonical key, is deterministic.

use std::collections::BTreeSet;

/// Measurement words that leak into ingredient names when upstream data entry
/// folds quantities into the name field. Not applied by default; opt in with
/// [`NormalizeOptions::with_measurement_stopwords`].
pub const MEASUREMENT_STOPWORDS: &[&str] = &[
    "cup",
    "cups",
    "dash",
    "g",
    "gram",
    "grams",
    "kg",
    "kilogram",
    "kilograms",
    "l",
    "lb",
    "lbs",
    "liter",
    "liters",
    "ml",
    "milliliter",
    "milliliters",
    "ounce",
    "ounces",
    "oz",
    "pinch",
    "pound",
    "pounds",
    "tablespoon",
    "tablespoons",
    "tbsp",
    "teaspoon",
    "teaspoons",
    "tsp",
];

/// Knobs for [`tokenize`] and [`canonical_key`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Tokens dropped after splitting. Empty by default: scoring must see
    /// every word the datasets contain unless the caller says otherwise.
    pub stopwords: BTreeSet<String>,
}

impl NormalizeOptions {
    /// Options with the given stop-words, lower-cased.
    pub fn with_stopwords<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stopwords: words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Options that strip [`MEASUREMENT_STOPWORDS`].
    pub fn with_measurement_stopwords() -> Self {
        Self::with_stopwords(MEASUREMENT_STOPWORDS.iter().copied())
    }
}

/// Lower-cases, maps every non-alphanumeric character to a space, splits on
/// whitespace, and drops stop-words.
///
/// Idempotent: tokenizing the joined output yields the same set. Empty and
/// whitespace-only input produce an empty set; callers decide what that
/// means for them.
pub fn tokenize(raw: &str, opts: &NormalizeOptions) -> BTreeSet<String> {
    let mut cleaned = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_alphanumeric() {
            cleaned.extend(c.to_lowercase());
        } else {
            cleaned.push(' ');
        }
    }
    cleaned
        .split_whitespace()
        .filter(|t| !opts.stopwords.contains(*t))
        .map(str::to_owned)
        .collect()
}

/// Joins an already-normalized token set into its canonical key.
pub fn join_key(tokens: &BTreeSet<String>) -> String {
    tokens
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sorted tokens joined by single spaces: the exact-join key used to match
/// ingredients to food classes. Word order and punctuation in the source
/// never affect it, so "Tomatoes, chopped" and "chopped tomatoes" collide
/// deliberately.
pub fn canonical_key(raw: &str, opts: &NormalizeOptions) -> String {
    join_key(&tokenize(raw, opts))
}
