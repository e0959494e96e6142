//! Region labels derived from source file names.
//!
//! `"МСК Восток -.xlsx"` becomes `"МСК Восток"`: spreadsheet extensions are
//! removed, digits and dash/dot noise deleted, edge separators stripped and
//! whitespace collapsed. Extensions are removed wherever they occur in the
//! name, not only at the end.

use std::sync::LazyLock;

use regex::Regex;

static EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.(?:xlsx|XLSX|xls|XLS)").expect("static pattern"));
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static pattern"));

const DASHES: [char; 3] = ['-', '\u{2013}', '\u{2014}'];

fn is_noise(c: char) -> bool {
    c.is_ascii_digit() || c == '.' || DASHES.contains(&c)
}

fn is_edge_separator(c: char) -> bool {
    c.is_whitespace() || DASHES.contains(&c)
}

pub fn clean(file_name: &str) -> String {
    let without_extension = EXTENSION.replace_all(file_name, "");
    let stripped = without_extension
        .chars()
        .filter(|c| !is_noise(*c))
        .collect::<String>();
    let edges = stripped.trim().trim_matches(is_edge_separator);
    WHITESPACE_RUN.replace_all(edges, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn clean_strips_extension_and_trailing_dash() {
        assert_eq!(clean("ЕКБ -.xlsx"), "ЕКБ");
        assert_eq!(clean("МСК Восток -.xlsx"), "МСК Восток");
    }

    #[test]
    fn clean_removes_digits_and_dashes() {
        assert_eq!(clean("Краснодар123.xlsx"), "Краснодар");
        assert_eq!(clean("СПб-456.xls"), "СПб");
        assert_eq!(clean("Ростов — 2024.XLSX"), "Ростов");
    }

    #[test]
    fn clean_collapses_internal_whitespace() {
        assert_eq!(clean("  Нижний   Новгород\t01.xls"), "Нижний Новгород");
    }

    #[test]
    fn clean_removes_extension_mid_name() {
        assert_eq!(clean("Отчет.xlsx копия.xlsx"), "Отчет копия");
    }

    #[test]
    fn clean_accepts_names_made_of_noise() {
        assert_eq!(clean("2024-01.xlsx"), "");
        assert_eq!(clean(""), "");
    }

    #[test]
    fn clean_leaves_other_extensions_in_place() {
        assert_eq!(clean("Казань.csv"), "Казаньcsv");
    }

    proptest! {
        #[test]
        fn clean_output_has_no_noise_or_loose_whitespace(name in "\\PC{0,40}") {
            let region = clean(&name);
            prop_assert!(!region.chars().any(is_noise));
            prop_assert_eq!(region.trim(), region.as_str());
            prop_assert!(!region.contains("  "));
        }

        #[test]
        fn clean_is_idempotent(name in "[a-zA-Zа-яА-Я0-9 .\\-]{0,30}") {
            let once = clean(&name);
            prop_assert_eq!(clean(&once), once.clone());
        }
    }
}
