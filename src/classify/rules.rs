/// How one phrase is matched against a normalized name.
///
/// Phrases are uppercase words separated by single spaces and always match on
/// word boundaries, so `"TRUST"` does not fire on `"TRUSTY"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Matcher {
    /// Phrase appears anywhere.
    Word(&'static str),
    /// Name begins with the phrase.
    Prefix(&'static str),
    /// Name ends with the phrase.
    Suffix(&'static str),
}

impl Matcher {
    pub fn matches(&self, name: &NormalizedName) -> bool {
        match self {
            Matcher::Word(p) => name.padded.contains(&format!(" {p} ")),
            Matcher::Prefix(p) => name.padded.starts_with(&format!(" {p} ")),
            Matcher::Suffix(p) => name.padded.ends_with(&format!(" {p} ")),
        }
    }
}

/// One row of an ordered classification table: any matcher firing assigns `tag`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule<T: 'static> {
    pub id: &'static str,
    pub tag: T,
    pub matchers: &'static [Matcher],
}

impl<T> Rule<T> {
    pub fn matches(&self, name: &NormalizedName) -> bool {
        self.matchers.iter().any(|m| m.matches(name))
    }
}

/// Evaluate `rules` top to bottom; the first match wins.
pub fn first_match<'r, T>(rules: &'r [Rule<T>], name: &NormalizedName) -> Option<&'r Rule<T>> {
    rules.iter().find(|rule| rule.matches(name))
}

/// A name uppercased, with every run of punctuation and whitespace reduced to
/// one space, padded by a space on each side.
///
/// `"Smith Farms, L.L.C."` becomes `" SMITH FARMS L L C "`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    padded: String,
}

impl NormalizedName {
    pub fn new(raw: &str) -> Self {
        let mut padded = String::with_capacity(raw.len() + 2);
        padded.push(' ');
        let mut started = false;
        let mut gap = false;

        for c in raw.chars().flat_map(char::to_uppercase) {
            if c.is_alphanumeric() {
                if gap && started {
                    padded.push(' ');
                }
                gap = false;
                started = true;
                padded.push(c);
            } else {
                gap = true;
            }
        }

        padded.push(' ');
        Self { padded }
    }

    pub fn as_str(&self) -> &str {
        self.padded.trim()
    }

    pub fn is_blank(&self) -> bool {
        self.as_str().is_empty()
    }
}
