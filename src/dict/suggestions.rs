/// Read access to a word list, as needed to generate suggestions.
pub trait WordSource {
    fn contains(&self, word: &str) -> bool;

    fn words_with_prefix(&self, prefix: &str) -> Vec<String>;

    /// Every word. Expensive on large lists; only used for very short words.
    fn all_words(&self) -> Vec<String>;
}

/// Generate spelling suggestions using edit distance
pub fn generate(word: &str, source: &impl WordSource, max_suggestions: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    let mut suggestions = Vec::new();

    // 1. Prefix matching (fast)
    if chars.len() >= 3 {
        let prefix: String = chars[..3].iter().collect();
        let mut prefix_matches = source.words_with_prefix(&prefix);
        prefix_matches.sort_by_key(|w| edit_distance(word, w));
        prefix_matches.truncate(max_suggestions);

        for suggestion in prefix_matches {
            if suggestion != word && edit_distance(word, &suggestion) <= 2 {
                suggestions.push(suggestion);
            }
        }
    }

    if suggestions.len() >= max_suggestions {
        suggestions.truncate(max_suggestions);
        return suggestions;
    }

    // 2. Single edits (medium speed)
    for transform in generate_transformations(&chars) {
        if transform != word && source.contains(&transform) && !suggestions.contains(&transform) {
            suggestions.push(transform);
            if suggestions.len() >= max_suggestions {
                return suggestions;
            }
        }
    }

    // 3. Shorter prefix, wider distance
    if chars.len() >= 2 {
        let prefix: String = chars[..2].iter().collect();
        let mut prefix_matches = source.words_with_prefix(&prefix);
        prefix_matches.sort_by_key(|w| edit_distance(word, w));

        for candidate in prefix_matches {
            let distance = edit_distance(word, &candidate);
            if distance > 0 && distance <= 3 && !suggestions.contains(&candidate) {
                suggestions.push(candidate);
                if suggestions.len() >= max_suggestions {
                    return suggestions;
                }
            }
        }
    }

    // 4. Full scan, short words only
    if chars.len() <= 3 {
        let mut candidates: Vec<_> = source
            .all_words()
            .into_iter()
            .filter(|w| w.chars().count().abs_diff(chars.len()) <= 1)
            .take(100)
            .filter_map(|w| {
                let dist = edit_distance(word, &w);
                if dist > 0 && dist <= 2 && !suggestions.contains(&w) {
                    Some((dist, w))
                } else {
                    None
                }
            })
            .collect();

        candidates.sort_by_key(|(dist, _)| *dist);
        suggestions.extend(candidates.into_iter().map(|(_, w)| w));
    }

    suggestions.truncate(max_suggestions);
    suggestions
}

/// Suggestions for `word` that follow its capitalisation.
///
/// Word lists are mostly lower case, so `Speling` is looked up as `speling`
/// and its suggestions are capitalised again.
pub fn generate_matching_case(
    word: &str,
    source: &impl WordSource,
    max_suggestions: usize,
) -> Vec<String> {
    let lower = word.to_lowercase();
    if lower == word {
        return generate(word, source, max_suggestions);
    }

    let capitalized = word.chars().skip(1).all(|c| !c.is_uppercase());
    let mut suggestions = generate(word, source, max_suggestions);
    for candidate in generate(&lower, source, max_suggestions) {
        let candidate = if capitalized {
            capitalize(&candidate)
        } else {
            candidate.to_uppercase()
        };
        if candidate != word && !suggestions.contains(&candidate) {
            suggestions.push(candidate);
        }
    }
    suggestions.truncate(max_suggestions);
    suggestions
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Calculate Levenshtein distance between two strings
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut previous: Vec<usize> = (0..=b_chars.len()).collect();
    let mut current = vec![0; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            current[j + 1] = (previous[j + 1] + 1) // deletion
                .min(current[j] + 1) // insertion
                .min(previous[j] + cost); // substitution
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b_chars.len()]
}

/// Generate common transformations of a word
fn generate_transformations(chars: &[char]) -> Vec<String> {
    let mut transformations = Vec::new();

    // Deletions
    for i in 0..chars.len() {
        let mut new_word = chars.to_vec();
        new_word.remove(i);
        transformations.push(new_word.iter().collect());
    }

    // Transpositions (swap adjacent)
    for i in 0..chars.len().saturating_sub(1) {
        let mut new_word = chars.to_vec();
        new_word.swap(i, i + 1);
        transformations.push(new_word.iter().collect());
    }

    // Insertions, doubled letters first
    for i in 0..=chars.len() {
        if i > 0 {
            let mut doubled = chars.to_vec();
            doubled.insert(i, chars[i - 1]);
            transformations.push(doubled.iter().collect());
        }
        for letter in 'a'..='z' {
            let mut new_word = chars.to_vec();
            new_word.insert(i, letter);
            transformations.push(new_word.iter().collect());
        }
    }

    // Replacements (common typos)
    let common_replacements = [
        ('a', 'e'),
        ('e', 'i'),
        ('i', 'o'),
        ('o', 'u'),
        ('b', 'v'),
        ('c', 'k'),
        ('f', 'v'),
        ('g', 'j'),
        ('m', 'n'),
        ('s', 'z'),
        ('t', 'd'),
    ];

    for (i, &ch) in chars.iter().enumerate() {
        for &(from, to) in &common_replacements {
            if ch == from {
                let mut new_word = chars.to_vec();
                new_word[i] = to;
                transformations.push(new_word.iter().collect());
            }
        }
    }

    transformations
}
