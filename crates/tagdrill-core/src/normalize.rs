//! Free-text normalization for answers and reference values.
//!
//! Reference tables are transcribed inconsistently: units present or absent,
//! full-width punctuation, different range separators. Both sides of every
//! comparison go through [`normalize`] so that these variants compare equal.

/// Tokens removed outright, in this order. Multi-character units come before
/// the bare `m` so that e.g. `m3/h` is removed as a whole.
const NOISE_TOKENS: [&str; 19] = [
    " ", "kw", "rpm", "r/min", "m3/h", "m3h", "m3", "/h", "bar", "mpa", "m", "（", "）", "(", ")",
    "：", ":", "，", ",",
];

/// Full-width separators and their ASCII equivalents.
const WIDTH_FOLDS: [(&str, &str); 3] = [("／", "/"), ("～", "~"), ("－", "-")];

/// Range separators folded into `/` after width folding.
const RANGE_FOLDS: [(&str, &str); 2] = [("~", "/"), ("-", "/")];

/// Reduce a free-text value to its comparison form.
///
/// Absent or empty input yields the empty string. The rewrite is repeated
/// until the value stops changing, since stripping one token can expose
/// another (`kkww` → `kw`) and folding a separator can form one
/// (`10-h` → `10/h` → `10`).
pub fn normalize(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    let mut s = rewrite(raw);
    loop {
        let next = rewrite(&s);
        if next == s {
            return s;
        }
        s = next;
    }
}

fn rewrite(raw: &str) -> String {
    let mut s = raw.trim().to_lowercase();
    for token in NOISE_TOKENS {
        s = s.replace(token, "");
    }
    for (from, to) in WIDTH_FOLDS.iter().chain(RANGE_FOLDS.iter()) {
        s = s.replace(from, to);
    }
    s
}
