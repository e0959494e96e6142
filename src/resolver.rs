//! Header resolution for a single canonical field.
//!
//! Aliases are tried in priority order; for each alias the headers are
//! scanned in their original order and compared after trimming surrounding
//! whitespace (case-sensitive). Only when no alias matches any header are the
//! field's regex fallbacks tried, again pattern by pattern, returning the
//! first header containing a case-insensitive match.

use crate::aliases::FieldDefinition;

/// Returns the raw header (as given, untrimmed) that supplies `field`.
pub fn resolve<'a, S>(headers: &'a [S], field: &FieldDefinition) -> Option<&'a str>
where
    S: AsRef<str>,
{
    resolve_index(headers, field).map(|idx| headers[idx].as_ref())
}

/// Position of the header that supplies `field`.
pub fn resolve_index<S>(headers: &[S], field: &FieldDefinition) -> Option<usize>
where
    S: AsRef<str>,
{
    for alias in &field.aliases {
        if let Some(idx) = headers
            .iter()
            .position(|header| header.as_ref().trim() == alias.as_str())
        {
            return Some(idx);
        }
    }
    field.regex_fallbacks.iter().find_map(|pattern| {
        headers
            .iter()
            .position(|header| pattern.is_match(header.as_ref()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aliases::CanonicalSchema;

    fn field(aliases: &[&str]) -> FieldDefinition {
        FieldDefinition::new(aliases[0], aliases)
    }

    #[test]
    fn alias_priority_beats_header_order() {
        let headers = ["Date", "Дата"];
        let definition = field(&["Дата проводки", "Дата", "Date"]);
        assert_eq!(resolve(&headers, &definition), Some("Дата"));
    }

    #[test]
    fn surrounding_whitespace_is_ignored_but_case_is_not() {
        let definition = field(&["Quantity"]);
        assert_eq!(resolve(&["  Quantity "], &definition), Some("  Quantity "));
        assert_eq!(resolve(&["quantity"], &definition), None);
    }

    #[test]
    fn first_matching_header_wins_for_duplicate_aliases() {
        let headers = ["Qty", "Qty "];
        let definition = field(&["Qty"]);
        assert_eq!(resolve_index(&headers, &definition), Some(0));
    }

    #[test]
    fn regex_fallback_is_case_insensitive_containment() {
        let definition = field(&["Количество"])
            .with_regex_fallbacks(&["количеств"])
            .unwrap();
        let headers = ["Материал", "Общее КОЛИЧЕСТВО, т"];
        assert_eq!(resolve(&headers, &definition), Some("Общее КОЛИЧЕСТВО, т"));
        assert_eq!(resolve_index(&headers, &definition), Some(1));
    }

    #[test]
    fn regex_fallback_runs_only_after_every_alias_fails() {
        let definition = field(&["Qty", "Quantity"])
            .with_regex_fallbacks(&["qty"])
            .unwrap();
        let headers = ["qty total", "Quantity"];
        assert_eq!(resolve(&headers, &definition), Some("Quantity"));
    }

    #[test]
    fn fallback_patterns_are_tried_in_order() {
        let definition = field(&["x"])
            .with_regex_fallbacks(&["second", "first"])
            .unwrap();
        let headers = ["first col", "second col"];
        assert_eq!(resolve(&headers, &definition), Some("second col"));
    }

    #[test]
    fn no_match_yields_none() {
        let definition = field(&["Транспортная накладная"]);
        assert_eq!(resolve(&["Материал"], &definition), None);
        assert_eq!(resolve::<&str>(&[], &definition), None);
    }

    #[test]
    fn canonical_headers_resolve_to_themselves() {
        let schema = CanonicalSchema::builtin().unwrap();
        let headers = schema.field_names();
        for (idx, definition) in schema.fields.iter().enumerate() {
            assert_eq!(resolve_index(&headers, definition), Some(idx));
        }
    }
}
