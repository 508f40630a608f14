/// Lowercase `name` and collapse every run of non-alphanumeric characters
/// into a single hyphen, with no hyphen at either end.
///
/// Alphanumeric is the Unicode notion, so accented names keep their letters.
/// The output alphabet is lowercase alphanumerics plus `-`, which makes the
/// function idempotent and the result safe to use as a file stem.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    out
}
