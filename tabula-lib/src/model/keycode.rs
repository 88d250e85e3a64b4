//! Keyboard-code normalization for `likecode` filters.
//!
//! Text typed with the wrong keyboard layout active ("ghbdtn" for "привет")
//! should still match. Both sides are mapped to the physical key that
//! produces each character on a QWERTY keyboard and lowercased; whitespace
//! is dropped.

/// Cyrillic ЙЦУКЕН letters and the QWERTY key at the same position.
const LAYOUT: &[(char, char)] = &[
    ('й', 'q'), ('ц', 'w'), ('у', 'e'), ('к', 'r'), ('е', 't'), ('н', 'y'),
    ('г', 'u'), ('ш', 'i'), ('щ', 'o'), ('з', 'p'), ('х', '['), ('ъ', ']'),
    ('ф', 'a'), ('ы', 's'), ('в', 'd'), ('а', 'f'), ('п', 'g'), ('р', 'h'),
    ('о', 'j'), ('л', 'k'), ('д', 'l'), ('ж', ';'), ('э', '\''), ('я', 'z'),
    ('ч', 'x'), ('с', 'c'), ('м', 'v'), ('и', 'b'), ('т', 'n'), ('ь', 'm'),
    ('б', ','), ('ю', '.'), ('ё', '`'),
];

/// Maps text to its keyboard-code form.
pub fn keycode(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            LAYOUT
                .iter()
                .find(|(cyr, _)| *cyr == c)
                .map(|(_, key)| *key)
                .unwrap_or(c)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::keycode;

    #[test]
    fn wrong_layout_matches() {
        assert_eq!(keycode("привет"), keycode("ghbdtn"));
        assert_eq!(keycode("Ghbd Tn"), "ghbdtn");
    }
}
