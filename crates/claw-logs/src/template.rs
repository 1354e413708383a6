//! Log file name templates.
//!
//! A template is literal text mixed with fixed-width placeholders:
//!
//! | Token | Replaced with                               | Width |
//! |-------|---------------------------------------------|-------|
//! | `%r`  | random hexadecimal id                       | 16    |
//! | `%sr` | short random hexadecimal id                 | 8     |
//! | `%t`  | local time as `yyMMddHHmmss`                | 12    |
//!
//! Tokens are case-insensitive. Any other `%` is literal text. Because every
//! placeholder has a fixed width, [`NameTemplate::matches`] is a single
//! positional scan without backtracking, which is what lets a file sink
//! recognize the files it created.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use rand::Rng;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// A fixed-width placeholder in a name template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Placeholder {
    /// `%r`: 16 random hex characters.
    Random,
    /// `%sr`: 8 random hex characters.
    ShortRandom,
    /// `%t`: timestamp formatted as `yyMMddHHmmss`.
    Time,
}

impl Placeholder {
    /// Number of characters this placeholder expands to.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Random => 16,
            Self::ShortRandom => 8,
            Self::Time => 12,
        }
    }

    /// The token that introduces this placeholder in a pattern.
    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Random => "%r",
            Self::ShortRandom => "%sr",
            Self::Time => "%t",
        }
    }

    fn render(self, now: &NaiveDateTime, out: &mut String) {
        match self {
            Self::Random | Self::ShortRandom => push_random_hex(self.width(), out),
            Self::Time => out.push_str(&now.format("%y%m%d%H%M%S").to_string()),
        }
    }
}

fn push_random_hex(len: usize, out: &mut String) {
    let mut rng = rand::thread_rng();
    out.extend((0..len).map(|_| char::from(HEX_DIGITS[rng.gen_range(0..HEX_DIGITS.len())])));
}

/// One piece of a compiled template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Text copied verbatim.
    Literal(String),
    /// A placeholder replaced on generation.
    Placeholder(Placeholder),
}

impl Segment {
    /// Number of characters this segment occupies in a generated name.
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Self::Literal(text) => text.chars().count(),
            Self::Placeholder(p) => p.width(),
        }
    }
}

/// A compiled file name template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameTemplate {
    segments: Vec<Segment>,
}

impl NameTemplate {
    /// Compiles a pattern into a template.
    ///
    /// Never fails: anything that is not a recognized token is literal text.
    #[must_use]
    pub fn compile(pattern: &str) -> Self {
        let chars: Vec<char> = pattern.chars().collect();
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut i = 0;

        while i < chars.len() {
            let token = if chars[i] == '%' {
                Self::token_at(&chars[i + 1..])
            } else {
                None
            };

            match token {
                Some((placeholder, consumed)) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(placeholder));
                    i += consumed;
                }
                None => {
                    literal.push(chars[i]);
                    i += 1;
                }
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Self { segments }
    }

    /// Recognizes the token following a `%`, longest match first.
    ///
    /// Returns the placeholder and the number of chars consumed including
    /// the `%`.
    fn token_at(rest: &[char]) -> Option<(Placeholder, usize)> {
        let lower = |idx: usize| rest.get(idx).map(char::to_ascii_lowercase);
        match (lower(0), lower(1)) {
            (Some('s'), Some('r')) => Some((Placeholder::ShortRandom, 3)),
            (Some('r'), _) => Some((Placeholder::Random, 2)),
            (Some('t'), _) => Some((Placeholder::Time, 2)),
            _ => None,
        }
    }

    /// Returns the compiled segments in order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of characters in every name this template generates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.iter().map(Segment::width).sum()
    }

    /// Returns true if the template generates empty names.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the template contains any random placeholder.
    #[must_use]
    pub fn has_random(&self) -> bool {
        self.segments.iter().any(|s| {
            matches!(
                s,
                Segment::Placeholder(Placeholder::Random | Placeholder::ShortRandom)
            )
        })
    }

    /// Generates a file name for the given local time.
    ///
    /// Each random placeholder is drawn independently.
    #[must_use]
    pub fn generate(&self, now: NaiveDateTime) -> String {
        let mut name = String::with_capacity(self.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => name.push_str(text),
                Segment::Placeholder(p) => p.render(&now, &mut name),
            }
        }
        name
    }

    /// Generates a file name for the current local time.
    #[must_use]
    pub fn generate_now(&self) -> String {
        self.generate(Local::now().naive_local())
    }

    /// Tests whether `candidate` could have been generated by this template.
    ///
    /// Literal segments must match exactly; placeholders only need room for
    /// their fixed width, their content is not inspected.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        let chars: Vec<char> = candidate.chars().collect();
        if chars.len() < self.len() {
            return false;
        }

        let mut cursor = 0;
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => {
                    for expected in text.chars() {
                        if chars.get(cursor) != Some(&expected) {
                            return false;
                        }
                        cursor += 1;
                    }
                }
                Segment::Placeholder(p) => {
                    cursor += p.width();
                    if cursor > chars.len() {
                        return false;
                    }
                }
            }
        }

        cursor == chars.len()
    }
}

impl FromStr for NameTemplate {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::compile(s))
    }
}

impl fmt::Display for NameTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => f.write_str(text)?,
                Segment::Placeholder(p) => f.write_str(p.token())?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use test_case::test_case;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, s))
            .expect("valid timestamp")
    }

    fn is_upper_hex(s: &str) -> bool {
        s.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c))
    }

    #[test]
    fn compile_recognizes_placeholders() {
        let template = NameTemplate::compile("app@%t.%sr.log");
        assert_eq!(
            template.segments(),
            &[
                Segment::Literal("app@".to_string()),
                Segment::Placeholder(Placeholder::Time),
                Segment::Literal(".".to_string()),
                Segment::Placeholder(Placeholder::ShortRandom),
                Segment::Literal(".log".to_string()),
            ]
        );
        assert_eq!(template.len(), 4 + 12 + 1 + 8 + 4);
    }

    #[test]
    fn compile_is_case_insensitive() {
        let template = NameTemplate::compile("%R%SR%T%sR");
        assert_eq!(
            template.segments(),
            &[
                Segment::Placeholder(Placeholder::Random),
                Segment::Placeholder(Placeholder::ShortRandom),
                Segment::Placeholder(Placeholder::Time),
                Segment::Placeholder(Placeholder::ShortRandom),
            ]
        );
    }

    #[test_case("100%" , "100%" ; "trailing percent")]
    #[test_case("%x.log", "%x.log" ; "unknown token")]
    #[test_case("%s.log", "%s.log" ; "short without r")]
    #[test_case("%%", "%%" ; "double percent")]
    fn compile_keeps_unmatched_percent_literal(pattern: &str, expected: &str) {
        let template = NameTemplate::compile(pattern);
        assert_eq!(template.segments(), &[Segment::Literal(expected.to_string())]);
        assert!(template.matches(expected));
    }

    #[test]
    fn percent_before_token_stays_literal() {
        let template = NameTemplate::compile("%%r");
        assert_eq!(
            template.segments(),
            &[
                Segment::Literal("%".to_string()),
                Segment::Placeholder(Placeholder::Random),
            ]
        );
    }

    #[test]
    fn generate_scenario() {
        let template = NameTemplate::compile("app@%t.%sr.log");
        let name = template.generate(at(2024, 1, 2, 3, 4, 5));

        assert!(name.starts_with("app@240102030405."));
        assert!(name.ends_with(".log"));
        let random = &name["app@240102030405.".len()..name.len() - ".log".len()];
        assert_eq!(random.len(), 8);
        assert!(is_upper_hex(random));

        assert!(template.matches(&name));
        assert!(!template.matches("app@24010203040.X.log"));
    }

    #[test]
    fn generate_draws_each_placeholder_independently() {
        let template = NameTemplate::compile("%r-%r");
        let name = template.generate_now();
        let (a, b) = name.split_at(16);
        assert_eq!(name.len(), 33);
        assert!(is_upper_hex(a));
        assert_ne!(a, &b[1..]);
    }

    #[test]
    fn matches_rejects_wrong_length() {
        let template = NameTemplate::compile("log-%sr.txt");
        assert!(template.matches("log-ABCDEF12.txt"));
        assert!(!template.matches("log-ABCDEF1.txt"));
        assert!(!template.matches("log-ABCDEF123.txt"));
        assert!(!template.matches(""));
    }

    #[test]
    fn matches_rejects_altered_literal() {
        let template = NameTemplate::compile("log-%sr.txt");
        assert!(!template.matches("LOG-ABCDEF12.txt"));
        assert!(!template.matches("log-ABCDEF12.tx_"));
    }

    #[test]
    fn matches_does_not_validate_placeholder_content() {
        let template = NameTemplate::compile("%t.log");
        assert!(template.matches("not-a-time!.log"));
    }

    #[test]
    fn matches_counts_chars_not_bytes() {
        let template = NameTemplate::compile("жур-%sr");
        let name = template.generate_now();
        assert!(template.matches(&name));
        assert!(template.matches("жур-ééééééé1"));
    }

    #[test]
    fn literal_only_template() {
        let template = NameTemplate::compile("app.log");
        assert!(!template.has_random());
        assert_eq!(template.generate_now(), "app.log");
        assert!(template.matches("app.log"));
    }

    #[test]
    fn display_renders_canonical_pattern() {
        let template: NameTemplate = "App@%T.%SR.log".parse().expect("infallible");
        assert_eq!(template.to_string(), "App@%t.%sr.log");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn pattern() -> impl Strategy<Value = String> {
            prop::collection::vec(
                prop_oneof![
                    "[a-zA-Z0-9._@-]{1,6}",
                    Just("%r".to_string()),
                    Just("%sr".to_string()),
                    Just("%t".to_string()),
                ],
                0..6,
            )
            .prop_map(|parts| parts.concat())
        }

        proptest! {
            #[test]
            fn generated_names_always_match(
                pattern in pattern(),
                secs in 0i64..4_102_444_800,
            ) {
                let template = NameTemplate::compile(&pattern);
                let now = chrono::DateTime::from_timestamp(secs, 0)
                    .map(|dt| dt.naive_utc())
                    .unwrap_or_default();
                let name = template.generate(now);
                prop_assert_eq!(name.chars().count(), template.len());
                prop_assert!(template.matches(&name));
            }

            #[test]
            fn extended_names_never_match(pattern in pattern(), suffix in "[a-z]{1,4}") {
                let template = NameTemplate::compile(&pattern);
                let name = format!("{}{suffix}", template.generate_now());
                prop_assert!(!template.matches(&name));
            }
        }
    }
}
