use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for repository language tags
///
/// Metadata values are tagged with locale-style codes such as `en`, `pt_BR`
/// or `zh-CN`. Only the primary subtag is checked against ISO 639; region
/// subtags are passed through untouched.
/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// ISO 639-2/B codes that differ from their 639-2/T form
const PART2B_TO_PART2T: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Lowercased primary subtag of a tag: `pt_BR` -> `pt`, `zh-CN` -> `zh`
pub fn primary_subtag(tag: &str) -> String {
    tag.trim()
        .split(['_', '-'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}

fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    PART2B_TO_PART2T
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

/// Validate the primary subtag of a language tag
pub fn validate_language_tag(tag: &str) -> Result<LanguageCodeType> {
    let code = primary_subtag(tag);

    match code.len() {
        2 if Language::from_639_1(&code).is_some() => Ok(LanguageCodeType::Part1),
        3 if Language::from_639_3(&code).is_some() => Ok(LanguageCodeType::Part2T),
        3 if part2b_to_part2t(&code).is_some() => Ok(LanguageCodeType::Part2B),
        _ => Err(anyhow!("Invalid language code: {}", tag)),
    }
}

/// Normalize the primary subtag to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(tag: &str) -> Result<String> {
    let code = primary_subtag(tag);

    if code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if code.len() == 3 {
        if Language::from_639_3(&code).is_some() {
            return Ok(code);
        }
        if let Some(part2t) = part2b_to_part2t(&code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", tag))
}

/// English name of the language a tag refers to
pub fn get_language_name(tag: &str) -> Result<String> {
    let normalized = normalize_to_part2t(tag)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Name for log lines, falling back to the raw tag
pub fn display_name(tag: &str) -> String {
    get_language_name(tag).unwrap_or_else(|_| tag.to_string())
}
