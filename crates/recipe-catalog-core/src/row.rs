//! Dataset row parser.
//!
//! Turns one raw CSV record from the recipe dataset into a [`ParsedRow`].
//! Column positions are fixed by the dataset's schema:
//!
//! | Index | Column        | Use                       |
//! |-------|---------------|---------------------------|
//! | 1     | `name`        | recipe title              |
//! | 3     | `minutes`     | cook time                 |
//! | 8     | `tags`        | first tag → category name |
//! | 10    | `ingredients` | ingredient names          |
//! | 11    | `description` | recipe description        |
//!
//! Tag and ingredient columns hold pseudo-lists such as `['a', 'b']`.
//! [`split_list`] normalizes them; the exact normalization decides entity
//! identity, so it must stay stable.

use csv::StringRecord;
use thiserror::Error;

/// Minimum number of fields a data row must carry.
pub const MIN_COLUMNS: usize = 12;

/// Category used when a row's tag list yields no tokens.
pub const FALLBACK_CATEGORY: &str = "General";

const TITLE: usize = 1;
const COOK_TIME: usize = 3;
const TAGS: usize = 8;
const INGREDIENTS: usize = 10;
const DESCRIPTION: usize = 11;

/// Why a row was skipped. Rejections never abort a seed run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowRejection {
    #[error("insufficient columns: expected at least {MIN_COLUMNS}, found {found}")]
    InsufficientColumns { found: usize },

    #[error("empty title")]
    EmptyTitle,

    #[error("cook time is not an integer: {value:?}")]
    InvalidCookTime { value: String },

    #[error("cook time is negative: {value}")]
    NegativeCookTime { value: i32 },
}

/// Typed fields extracted from one dataset row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    pub title: String,
    pub cook_time: i32,
    pub category: String,
    pub ingredients: Vec<String>,
    pub description: String,
}

/// Parse a data row, or explain why it was rejected.
pub fn parse_row(record: &StringRecord) -> Result<ParsedRow, RowRejection> {
    if record.len() < MIN_COLUMNS {
        return Err(RowRejection::InsufficientColumns {
            found: record.len(),
        });
    }

    let field = |i: usize| record.get(i).unwrap_or_default();

    let title = field(TITLE);
    if title.is_empty() {
        return Err(RowRejection::EmptyTitle);
    }

    let raw_cook_time = field(COOK_TIME);
    let cook_time: i32 = raw_cook_time
        .parse()
        .map_err(|_| RowRejection::InvalidCookTime {
            value: raw_cook_time.to_string(),
        })?;
    if cook_time < 0 {
        return Err(RowRejection::NegativeCookTime { value: cook_time });
    }

    Ok(ParsedRow {
        title: title.to_string(),
        cook_time,
        category: first_tag(field(TAGS)),
        ingredients: split_list(field(INGREDIENTS)),
        description: field(DESCRIPTION).to_string(),
    })
}

/// Normalize a pseudo-list: drop `[`, `]`, `'` and `"`, split on commas,
/// trim each token, and discard empty tokens. Order is preserved.
pub fn split_list(raw: &str) -> Vec<String> {
    let stripped: String = raw
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '\'' | '"'))
        .collect();

    stripped
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// First token of a tag list, or [`FALLBACK_CATEGORY`].
pub fn first_tag(raw: &str) -> String {
    split_list(raw)
        .into_iter()
        .next()
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    fn pasta_salad() -> StringRecord {
        record(&[
            "id",
            "Pasta Salad",
            "url",
            "25",
            "author",
            "date",
            "nutrition",
            "3",
            "['30-minutes-or-less', 'pasta']",
            "steps",
            "['pasta', 'tomato', 'pasta']",
            "A simple salad.",
        ])
    }

    #[test]
    fn test_parse_valid_row() {
        let row = parse_row(&pasta_salad()).unwrap();
        assert_eq!(row.title, "Pasta Salad");
        assert_eq!(row.cook_time, 25);
        assert_eq!(row.category, "30-minutes-or-less");
        assert_eq!(row.ingredients, vec!["pasta", "tomato", "pasta"]);
        assert_eq!(row.description, "A simple salad.");
    }

    #[test]
    fn test_fields_taken_verbatim() {
        let mut fields = pasta_salad().iter().map(str::to_string).collect::<Vec<_>>();
        fields[1] = "  Spaced Title ".into();
        fields[11] = String::new();
        let row = parse_row(&StringRecord::from(fields)).unwrap();
        assert_eq!(row.title, "  Spaced Title ");
        assert_eq!(row.description, "");
    }

    #[test]
    fn test_extra_columns_ignored() {
        let mut fields = pasta_salad().iter().map(str::to_string).collect::<Vec<_>>();
        fields.push("extra".into());
        assert!(parse_row(&StringRecord::from(fields)).is_ok());
    }

    #[test]
    fn test_reject_short_row() {
        let short = record(&["a", "b", "c", "1", "e", "f", "g", "h", "i", "j"]);
        assert_eq!(
            parse_row(&short),
            Err(RowRejection::InsufficientColumns { found: 10 })
        );
    }

    #[test]
    fn test_reject_non_integer_cook_time() {
        for bad in ["abc", "", "12.5", " 25"] {
            let mut fields = pasta_salad().iter().map(str::to_string).collect::<Vec<_>>();
            fields[3] = bad.into();
            assert_eq!(
                parse_row(&StringRecord::from(fields)),
                Err(RowRejection::InvalidCookTime { value: bad.into() }),
                "cook time {:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_reject_negative_cook_time() {
        let mut fields = pasta_salad().iter().map(str::to_string).collect::<Vec<_>>();
        fields[3] = "-5".into();
        assert_eq!(
            parse_row(&StringRecord::from(fields)),
            Err(RowRejection::NegativeCookTime { value: -5 })
        );
    }

    #[test]
    fn test_zero_cook_time_accepted() {
        let mut fields = pasta_salad().iter().map(str::to_string).collect::<Vec<_>>();
        fields[3] = "0".into();
        assert_eq!(parse_row(&StringRecord::from(fields)).unwrap().cook_time, 0);
    }

    #[test]
    fn test_reject_empty_title() {
        let mut fields = pasta_salad().iter().map(str::to_string).collect::<Vec<_>>();
        fields[1] = String::new();
        assert_eq!(
            parse_row(&StringRecord::from(fields)),
            Err(RowRejection::EmptyTitle)
        );
    }

    #[test]
    fn test_whitespace_title_kept_verbatim() {
        let mut fields = pasta_salad().iter().map(str::to_string).collect::<Vec<_>>();
        fields[1] = "   ".into();
        let row = parse_row(&StringRecord::from(fields)).unwrap();
        assert_eq!(row.title, "   ");
        assert_eq!(row.cook_time, 25);
    }

    #[test]
    fn test_split_list_strips_brackets_and_quotes() {
        assert_eq!(
            split_list(r#"['salt', "black pepper", 'olive oil']"#),
            vec!["salt", "black pepper", "olive oil"]
        );
    }

    #[test]
    fn test_split_list_discards_empty_tokens() {
        assert_eq!(split_list("[, 'a',, ' ', 'b',]"), vec!["a", "b"]);
        assert!(split_list("[]").is_empty());
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_split_list_strips_inner_quotes() {
        // Apostrophes inside names are removed along with the delimiters.
        assert_eq!(split_list("['hershey's kisses']"), vec!["hersheys kisses"]);
    }

    #[test]
    fn test_first_tag_fallback() {
        assert_eq!(first_tag("[]"), FALLBACK_CATEGORY);
        assert_eq!(first_tag("['', ' ']"), FALLBACK_CATEGORY);
        assert_eq!(first_tag("[' ', 'easy']"), "easy");
    }

    #[test]
    fn test_category_case_preserved() {
        assert_eq!(first_tag("['Main-Dish']"), "Main-Dish");
    }
}
