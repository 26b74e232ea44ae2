//! Media-type detection.
//!
//! A best-effort keyword scan used only to pick a display icon. Categories are
//! checked in a fixed priority order and the first one with any matching
//! keyword wins, so "this film's soundtrack" is `Movies`, not `Music`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Movies,
    Music,
    Books,
    Games,
    Tv,
    Food,
    Technology,
    General,
}

/// Keyword sets in match priority order. `General` is the fallback and has none.
const KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Movies, &["movie", "film", "watch", "cinema", "actor", "director"]),
    (Category::Music, &["song", "album", "music", "band", "artist", "listen"]),
    (Category::Books, &["book", "novel", "author", "read", "writer"]),
    (Category::Games, &["game", "play", "gaming", "console", "xbox", "playstation"]),
    (Category::Tv, &["show", "series", "episode", "season", "television"]),
    (Category::Food, &["food", "restaurant", "dish", "menu", "chef", "taste"]),
    (Category::Technology, &["tech", "gadget", "device", "computer", "phone", "software"]),
];

impl Category {
    pub fn all() -> [Category; 8] {
        [
            Category::Movies,
            Category::Music,
            Category::Books,
            Category::Games,
            Category::Tv,
            Category::Food,
            Category::Technology,
            Category::General,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Movies => "movies",
            Category::Music => "music",
            Category::Books => "books",
            Category::Games => "games",
            Category::Tv => "tv",
            Category::Food => "food",
            Category::Technology => "technology",
            Category::General => "general",
        }
    }

    /// Display glyph for this category.
    pub fn icon(&self) -> &'static str {
        match self {
            Category::Movies => "🎬",
            Category::Music => "🎵",
            Category::Books => "📚",
            Category::Games => "🎮",
            Category::Tv => "📺",
            Category::Food => "🍽️",
            Category::Technology => "💻",
            Category::General => "🔍",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify free text into a media category. Total: anything without a
/// recognised keyword (including the empty string) is `General`.
pub fn classify(text: &str) -> Category {
    let text = text.to_lowercase();

    KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|word| text.contains(word)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::General)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_example_per_category() {
        let cases = [
            ("Can you review the movie Inception?", Category::Movies),
            ("Thoughts on the new album?", Category::Music),
            ("Is this novel any good?", Category::Books),
            ("Review Elden Ring on Xbox", Category::Games),
            ("Rate the latest season of Severance", Category::Tv),
            ("Critique this ramen dish", Category::Food),
            ("Rate the new smartphone", Category::Technology),
        ];
        for (text, expected) in cases {
            assert_eq!(classify(text), expected, "classifying {:?}", text);
        }
    }

    #[test]
    fn unrecognised_text_is_general() {
        assert_eq!(classify("What do you think of silence?"), Category::General);
        assert_eq!(classify(""), Category::General);
    }

    #[test]
    fn earlier_category_wins_ties() {
        assert_eq!(classify("this film's soundtrack"), Category::Movies);
        assert_eq!(classify("a song from a film"), Category::Movies);
        assert_eq!(classify("a song I heard in a game"), Category::Music);
        assert_eq!(classify("the chef from that tv series"), Category::Tv);
    }

    #[test]
    fn every_keyword_selects_its_category() {
        for (category, words) in KEYWORDS {
            for word in *words {
                assert_eq!(classify(word), *category, "keyword {:?}", word);
                assert_eq!(classify(&word.to_uppercase()), *category, "keyword {:?}", word);
            }
        }
    }

    #[test]
    fn priority_holds_for_every_category_pair() {
        for (i, (earlier, earlier_words)) in KEYWORDS.iter().enumerate() {
            for (_, later_words) in &KEYWORDS[i + 1..] {
                for a in *earlier_words {
                    for b in *later_words {
                        assert_eq!(classify(&format!("{} {}", a, b)), *earlier, "{:?} vs {:?}", a, b);
                        assert_eq!(classify(&format!("{} {}", b, a)), *earlier, "{:?} vs {:?}", b, a);
                    }
                }
            }
        }
    }

    #[test]
    fn keyword_table_is_in_priority_order() {
        let order: Vec<Category> = KEYWORDS.iter().map(|(category, _)| *category).collect();
        assert_eq!(order, Category::all()[..7].to_vec());
        assert_eq!(KEYWORDS.iter().map(|(_, words)| words.len()).sum::<usize>(), 40);
    }

    #[test]
    fn case_insensitive() {
        assert_eq!(classify("MOVIE NIGHT"), Category::Movies);
        assert_eq!(classify("PlayStation exclusives"), Category::Games);
    }

    #[test]
    fn plain_substring_matching() {
        // "already" contains "read"
        assert_eq!(classify("I already finished it"), Category::Books);
    }

    #[test]
    fn classify_is_deterministic() {
        let text = "the director's cut of the album";
        assert_eq!(classify(text), classify(text));
    }

    #[test]
    fn every_category_has_an_icon() {
        for category in Category::all() {
            assert!(!category.icon().is_empty());
        }
        assert_eq!(Category::Movies.icon(), "🎬");
        assert_eq!(Category::General.icon(), "🔍");
    }
}
