//! Turns raw display names into canonical lowercase ASCII tokens.

use crate::core::error::{AppError, Result};
use crate::core::models::NameTokens;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Letters that have no canonical decomposition to ASCII.
fn transliterate(c: char) -> Option<&'static str> {
    Some(match c {
        'ß' => "ss",
        'æ' | 'Æ' => "ae",
        'œ' | 'Œ' => "oe",
        'ø' | 'Ø' => "o",
        'ł' | 'Ł' => "l",
        'đ' | 'Đ' | 'ð' | 'Ð' => "d",
        'þ' | 'Þ' => "th",
        'ı' => "i",
        _ => return None,
    })
}

/// Lowercases, strips diacritics and keeps ASCII alphanumerics only.
fn fold_token(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    for c in raw.nfkd().filter(|c| !is_combining_mark(*c)) {
        if let Some(replacement) = transliterate(c) {
            folded.push_str(replacement);
        } else if c.is_ascii_alphanumeric() {
            folded.push(c.to_ascii_lowercase());
        }
    }
    folded
}

/// Normalizes a display name into tokens.
///
/// Splits on any whitespace, folds every part to lowercase ASCII and drops
/// parts that end up empty. Fails with `AppError::MalformedName` when nothing
/// remains. Normalizing an already normalized name returns the same tokens.
pub fn normalize_name(raw: &str) -> Result<NameTokens> {
    let tokens: Vec<String> = raw
        .split_whitespace()
        .map(fold_token)
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.is_empty() {
        tracing::debug!("Name '{}' has no usable tokens after normalization", raw);
        return Err(AppError::MalformedName(raw.to_string()));
    }
    Ok(NameTokens::from_normalized(tokens))
}
