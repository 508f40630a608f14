/// Tokens that keep their uppercase spelling under title casing.
pub const ACRONYMS: &[&str] = &[
    "ARC", "CCC", "CFAP", "CREP", "CRP", "CSP", "DMC", "ECP", "EFRP", "ELAP", "EQIP", "ERP",
    "FSA", "II", "III", "IV", "LDP", "LFP", "LIP", "LLC", "LLP", "LP", "MAL", "MFP", "NAP",
    "NRCS", "OCCSP", "PLC", "PLLC", "SMHPP", "TAP", "US", "USA", "USDA", "WHIP",
];

pub fn is_acronym(token: &str) -> bool {
    let upper = token.to_uppercase();
    ACRONYMS.contains(&upper.as_str())
}

/// Capitalize every whitespace-delimited token and lowercase the rest of it.
///
/// Tokens on the acronym list are uppercased instead, whatever their input
/// casing. Hyphenated compounds are cased per part. Whitespace runs collapse
/// to single spaces.
pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| word.split('-').map(case_part).collect::<Vec<_>>().join("-"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn case_part(part: &str) -> String {
    let bare: String = part.chars().filter(|c| c.is_alphanumeric()).collect();
    if !bare.is_empty() && is_acronym(&bare) {
        return part.to_uppercase();
    }

    let mut out = String::with_capacity(part.len());
    let mut started = false;
    for c in part.chars() {
        if started {
            out.extend(c.to_lowercase());
        } else if c.is_alphabetic() {
            out.extend(c.to_uppercase());
            started = true;
        } else if c.is_numeric() {
            // "2ND" reads as "2nd", not "2Nd"
            out.push(c);
            started = true;
        } else {
            out.push(c);
        }
    }
    out
}

/// Turn a raw program code such as `"CONSERVATION_RESERVE PROGRAM PROGRAM - "`
/// into a display label (`"Conservation Reserve Program"`).
///
/// Only string transforms are applied: underscores become spaces, adjacent
/// repeated words collapse, dangling separators are dropped, and the result
/// is title cased with acronyms kept uppercase.
pub fn format_program_name(code: &str) -> String {
    let spaced: String = code
        .chars()
        .map(|c| if c == '_' { ' ' } else { c })
        .collect();

    let mut words: Vec<&str> = Vec::new();
    for word in spaced.split_whitespace() {
        if let Some(prev) = words.last() {
            if prev.eq_ignore_ascii_case(word) {
                continue;
            }
        }
        words.push(word);
    }

    while words.first().is_some_and(|w| is_separator(w)) {
        words.remove(0);
    }
    while words.last().is_some_and(|w| is_separator(w)) {
        words.pop();
    }

    title_case(&words.join(" "))
}

fn is_separator(word: &str) -> bool {
    word.chars().all(|c| matches!(c, '-' | '/' | ':' | ',' | '&'))
}
