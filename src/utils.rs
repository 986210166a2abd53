//! Text helpers for turning query/passage fields into model inputs.

use crate::errors::RerankDataError;
use crate::types::FormattedText;

/// Normalize a title-like field: hyphens become spaces, outer whitespace is trimmed.
pub fn normalize_title(title: &str) -> String {
    title.replace('-', " ").trim().to_string()
}

/// Build one model-input string from a query and a passage's content fields.
///
/// Output layout: `"{query_prefix} {query_text} {passage_prefix} {f1}{separator}{f2}..."`,
/// trimmed. The first field is treated as a title and passed through
/// [`normalize_title`]. The caller's slice is left untouched.
pub fn format_sample<S: AsRef<str>>(
    query_text: &str,
    content_fields: &[S],
    query_prefix: &str,
    passage_prefix: &str,
    separator: &str,
) -> Result<FormattedText, RerankDataError> {
    let Some((title, rest)) = content_fields.split_first() else {
        return Err(RerankDataError::EmptyInput(
            "sample formatter needs at least one content field".to_string(),
        ));
    };

    let mut fields = Vec::with_capacity(content_fields.len());
    fields.push(normalize_title(title.as_ref()));
    fields.extend(rest.iter().map(|field| field.as_ref().to_string()));

    let joined = fields.join(separator);
    Ok(format!("{query_prefix} {query_text} {passage_prefix} {joined}")
        .trim()
        .to_string())
}
