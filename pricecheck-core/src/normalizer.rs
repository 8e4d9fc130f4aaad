//! Product name normalisation and listing relevance matching.
//!
//! [`normalize`] turns a free-text product name into a [`NormalizedQuery`]:
//! the literal trimmed text that is sent to every source, plus an optional
//! brand (from a fixed vocabulary) and model token (from three regex
//! patterns tried in priority order). [`matches`] uses those hints to decide
//! whether a listing title is about the same product.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

use crate::types::NormalizedQuery;

/// Known consumer/electronics brands, in match priority order.
const KNOWN_BRANDS: &[&str] = &[
    "sony",
    "apple",
    "samsung",
    "bose",
    "lg",
    "panasonic",
    "philips",
    "jbl",
    "sennheiser",
    "audio-technica",
    "beyerdynamic",
    "shure",
    "logitech",
    "razer",
    "corsair",
    "steelseries",
    "hyperx",
    "dell",
    "hp",
    "lenovo",
    "asus",
    "acer",
    "msi",
    "nvidia",
    "amd",
    "intel",
    "canon",
    "nikon",
    "fujifilm",
    "gopro",
    "dyson",
    "kitchenaid",
    "ninja",
    "instant pot",
    "vitamix",
    "nintendo",
    "playstation",
    "xbox",
    "microsoft",
    "google",
    "amazon",
    "meta",
    "oculus",
    "anker",
    "belkin",
    "tp-link",
    "netgear",
];

/// Model-number patterns, highest priority first.
const MODEL_PATTERNS: &[&str] = &[
    // WH-1000XM5, XM5, A2234
    r"\b([A-Z]{1,3}-?\d{2,4}[A-Z]{0,3}\d{0,2})\b",
    // 1000XM, 65C1
    r"\b(\d{2,4}[A-Z]{1,3})\b",
    // AirPods3, Galaxy22
    r"\b([A-Z]+\d+[A-Z]*\d*)\b",
];

static BRAND_REGEXES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
static MODEL_REGEXES: OnceLock<Vec<Regex>> = OnceLock::new();

fn brand_regexes() -> &'static [(&'static str, Regex)] {
    BRAND_REGEXES.get_or_init(|| {
        KNOWN_BRANDS
            .iter()
            .filter_map(|brand| {
                let pattern = format!(r"\b{}\b", regex::escape(brand));
                match Regex::new(&pattern) {
                    Ok(re) => Some((*brand, re)),
                    Err(err) => {
                        tracing::error!(brand, error = %err, "invalid brand pattern");
                        None
                    }
                }
            })
            .collect()
    })
}

fn model_regexes() -> &'static [Regex] {
    MODEL_REGEXES.get_or_init(|| {
        MODEL_PATTERNS
            .iter()
            .filter_map(|pattern| {
                match RegexBuilder::new(pattern).case_insensitive(true).build() {
                    Ok(re) => Some(re),
                    Err(err) => {
                        tracing::error!(pattern, error = %err, "invalid model pattern");
                        None
                    }
                }
            })
            .collect()
    })
}

/// Normalise a raw product name.
///
/// Never fails: input with no recognisable brand or model yields a query
/// whose `query_text` is the trimmed input and whose hints are both absent.
///
/// # Examples
///
/// ```
/// use pricecheck_core::normalizer::normalize;
///
/// let q = normalize("  Sony WH-1000XM5 Headphones ");
/// assert_eq!(q.brand(), Some("Sony"));
/// assert_eq!(q.model(), Some("WH-1000XM5"));
/// assert_eq!(q.query_text(), "Sony WH-1000XM5 Headphones");
/// ```
pub fn normalize(raw_name: &str) -> NormalizedQuery {
    let cleaned = raw_name.trim();
    let lowered = cleaned.to_lowercase();

    let brand = brand_regexes()
        .iter()
        .find(|(_, re)| re.is_match(&lowered))
        .map(|(brand, _)| title_case(brand));

    let model = model_regexes()
        .iter()
        .find_map(|re| re.captures(cleaned))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_uppercase());

    NormalizedQuery::new(brand, model, cleaned.to_string())
}

/// Check whether a listing title refers to the normalised product.
///
/// - If a model is known, the title must contain it (case-insensitive),
///   either verbatim or with hyphens removed on both sides.
/// - If a brand is known, the title must contain it (case-insensitive).
pub fn matches(listing_title: &str, query: &NormalizedQuery) -> bool {
    let title_lower = listing_title.to_lowercase();

    if let Some(model) = query.model() {
        let model_lower = model.to_lowercase();
        let model_no_hyphen = model_lower.replace('-', "");
        let title_no_hyphen = title_lower.replace('-', "");

        if !title_lower.contains(&model_lower) && !title_no_hyphen.contains(&model_no_hyphen) {
            return false;
        }
    }

    if let Some(brand) = query.brand() {
        if !title_lower.contains(&brand.to_lowercase()) {
            return false;
        }
    }

    true
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}
