//! Case folding and occurrence scanning for term detection

/// Lowercase text one character at a time with `char::to_lowercase`.
///
/// Agrees with `str::to_lowercase` except for the context-dependent final
/// sigma, which is always folded to 'σ' here.
pub fn fold_case(text: &str) -> String {
    if text.is_ascii() {
        return text.to_ascii_lowercase();
    }
    text.chars().flat_map(char::to_lowercase).collect()
}

/// A lowercased transcript that remembers where each byte came from.
///
/// Lowercasing can change UTF-8 width ('ẞ' -> 'ß', the Kelvin sign -> 'k') or
/// expand one char into two ('İ' -> "i̇"), so folded offsets are translated
/// back to the original text before they are reported.
#[derive(Debug, Clone)]
pub struct FoldedText {
    folded: String,
    /// Original start offset of the char that produced each folded byte,
    /// plus one trailing entry holding the original length
    origins: Vec<usize>,
}

impl FoldedText {
    pub fn new(text: &str) -> Self {
        if text.is_ascii() {
            return Self {
                folded: text.to_ascii_lowercase(),
                origins: (0..=text.len()).collect(),
            };
        }

        let mut folded = String::with_capacity(text.len());
        let mut origins = Vec::with_capacity(text.len() + 1);
        for (start, ch) in text.char_indices() {
            for lower in ch.to_lowercase() {
                folded.push(lower);
                origins.extend(std::iter::repeat(start).take(lower.len_utf8()));
            }
        }
        origins.push(text.len());

        Self { folded, origins }
    }

    pub fn as_str(&self) -> &str {
        &self.folded
    }

    /// True when folded byte `pos` starts the expansion of an original char
    fn is_aligned(&self, pos: usize) -> bool {
        pos == 0 || self.origins[pos] != self.origins[pos - 1]
    }

    /// Every occurrence of an already-folded `needle`, as `(start, length)`
    /// byte spans of the original text. Overlaps are included.
    ///
    /// Hits that start or end inside a multi-char expansion (the "i" of a
    /// folded 'İ') are dropped: no original span re-slices to the needle.
    pub fn find_spans(&self, needle: &str) -> Vec<(usize, usize)> {
        find_all_occurrences(&self.folded, needle)
            .into_iter()
            .filter(|&pos| self.is_aligned(pos) && self.is_aligned(pos + needle.len()))
            .map(|pos| {
                let start = self.origins[pos];
                (start, self.origins[pos + needle.len()] - start)
            })
            .collect()
    }
}

/// Find the start offset of every occurrence of `needle` in `haystack`,
/// including overlapping ones ("aa" in "aaa" yields 0 and 1).
///
/// After each hit the cursor moves forward by one character, not by the
/// needle length. An empty needle yields no positions.
pub fn find_all_occurrences(haystack: &str, needle: &str) -> Vec<usize> {
    let mut positions = Vec::new();
    let Some(first) = needle.chars().next() else {
        return positions;
    };
    let step = first.len_utf8();

    let mut cursor = 0;
    while let Some(found) = haystack[cursor..].find(needle) {
        let start = cursor + found;
        positions.push(start);
        // The hit begins with `first`, so this lands on the next char boundary
        cursor = start + step;
    }

    positions
}
