//! Value comparison for client-side sorting

use std::cmp::Ordering;

use crate::model::Value;

use super::SortDirection;

/// Compares two cell values for sorting in `direction`.
///
/// Nulls sort last in both directions. Values that both read as numbers
/// compare numerically; everything else compares as lowercased text with
/// digit runs ordered by value (`"item2" < "item10"`).
pub fn compare_values(a: &Value, b: &Value, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Greater,
        (false, true) => return Ordering::Less,
        (false, false) => {}
    }

    let ordering = match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => natural_cmp(&a.to_string().to_lowercase(), &b.to_string().to_lowercase()),
    };

    match direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Numeric-aware string comparison.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();

    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let left = take_digits(&mut a);
                let right = take_digits(&mut b);
                let ordering = cmp_digit_runs(&left, &right);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(x), Some(y)) => {
                if x != y {
                    return x.cmp(&y);
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        digits.push(c);
    }
    digits
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        // "01" after "1"
        .then_with(|| a.len().cmp(&b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nulls_last_in_both_directions() {
        let null = Value::Null;
        let one = Value::Int(1);

        assert_eq!(compare_values(&null, &one, SortDirection::Asc), Ordering::Greater);
        assert_eq!(compare_values(&null, &one, SortDirection::Desc), Ordering::Greater);
        assert_eq!(compare_values(&one, &null, SortDirection::Desc), Ordering::Less);
        assert_eq!(compare_values(&null, &null, SortDirection::Asc), Ordering::Equal);
    }

    #[test]
    fn test_numeric_strings() {
        let a = Value::from("9");
        let b = Value::from("10.5");
        assert_eq!(compare_values(&a, &b, SortDirection::Asc), Ordering::Less);
        assert_eq!(compare_values(&a, &Value::Int(9), SortDirection::Asc), Ordering::Equal);
        assert_eq!(compare_values(&a, &b, SortDirection::Desc), Ordering::Greater);
    }

    #[test]
    fn test_case_insensitive_text() {
        let a = Value::from("apple");
        let b = Value::from("Banana");
        assert_eq!(compare_values(&a, &b, SortDirection::Asc), Ordering::Less);
        assert_eq!(
            compare_values(&Value::from("ABC"), &Value::from("abc"), SortDirection::Asc),
            Ordering::Equal
        );
    }

    #[test]
    fn test_natural_order() {
        assert_eq!(natural_cmp("item2", "item10"), Ordering::Less);
        assert_eq!(natural_cmp("item10", "item10"), Ordering::Equal);
        assert_eq!(natural_cmp("a", "ab"), Ordering::Less);
        assert_eq!(natural_cmp("v1.2", "v1.10"), Ordering::Less);
        assert_eq!(natural_cmp("1", "01"), Ordering::Less);
    }

    #[test]
    fn test_mixed_falls_back_to_text() {
        let number = Value::Int(5);
        let text = Value::from("abc");
        assert_eq!(compare_values(&number, &text, SortDirection::Asc), Ordering::Less);
    }
}
