/// Edit distance between two identifiers, for "did you mean" hints.
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.iter().enumerate() {
        let mut previous = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            let next = (previous + cost).min(row[j] + 1).min(row[j + 1] + 1);
            previous = row[j + 1];
            row[j + 1] = next;
        }
    }
    row[b.len()]
}

const MAX_SUGGESTIONS: usize = 5;
const MAX_DISTANCE: usize = 2;

/// Build a `{prefix} "a", "b" or "c"?` hint from the options within edit
/// distance two of `input`, closest first, capped at five.
pub fn make_suggestion<'a, I: IntoIterator<Item = &'a str>>(
    prefix: &str,
    options: I,
    input: &str,
) -> Option<String> {
    let mut candidates: Vec<(usize, &str)> = options
        .into_iter()
        .filter(|option| *option != input)
        .map(|option| (levenshtein_distance(input, option), option))
        .filter(|(distance, _)| *distance <= MAX_DISTANCE)
        .collect();
    if candidates.is_empty() {
        return None;
    }
    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    candidates.truncate(MAX_SUGGESTIONS);

    let mut suggestion = format!("{prefix} ");
    for (index, (_, option)) in candidates.iter().enumerate() {
        if index > 0 {
            if index == candidates.len() - 1 {
                suggestion.push_str(" or ");
            } else {
                suggestion.push_str(", ");
            }
        }
        suggestion.push('"');
        suggestion.push_str(option);
        suggestion.push('"');
    }
    suggestion.push('?');
    Some(suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_bounds() {
        assert_eq!(levenshtein_distance("bark", "bark"), 0);
        assert_eq!(levenshtein_distance("bark", "barks"), 1);
        assert_eq!(levenshtein_distance("meow", "bark"), 4);
    }

    #[test]
    fn suggests_close_names_only() {
        let suggestion = make_suggestion(
            "Did you mean",
            ["barkVolume", "meowVolume", "name"],
            "barkVolum",
        )
        .unwrap();
        assert_eq!(suggestion, r#"Did you mean "barkVolume"?"#);
        assert!(make_suggestion("Did you mean", ["name"], "somethingElse").is_none());
    }

    #[test]
    fn caps_at_five_candidates() {
        let options = ["ab1", "ab2", "ab3", "ab4", "ab5", "ab6", "ab7"];
        let suggestion = make_suggestion("Did you mean", options, "ab").unwrap();
        assert_eq!(suggestion.matches('"').count(), 10);
    }
}
