//! Artifact file names.
//!
//! Aggregate artifacts are `<prefix>_<YYYYMMDD_HHMMSS>.json` with the
//! timestamp fixed when the run starts. Titled artifacts are
//! `<sanitized title>_<YYYYMMDD_HHMMSS>.json`, where every character that is
//! not a word character or `-` becomes `_`. A titled name that is already
//! taken gets a `_2`, `_3`, ... suffix before the extension.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use promptforge_contracts::artifact::ArtifactName;

/// UTC timestamp format used in every artifact name.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

static UNSAFE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\-]").expect("title pattern is valid"));

/// Replace every non-word character other than `-` with `_`.
pub fn sanitize_title(title: &str) -> String {
    UNSAFE_CHARS.replace_all(title, "_").into_owned()
}

pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// The file name for `name`, without directory.
pub fn file_name(name: &ArtifactName) -> String {
    match name {
        ArtifactName::Aggregate { prefix, started_at } => {
            format!("{prefix}_{}.json", timestamp(started_at))
        }
        ArtifactName::Titled { title, created_at } => {
            format!("{}_{}.json", sanitize_title(title), timestamp(created_at))
        }
    }
}

/// `file_name` with a collision suffix: `n <= 1` leaves it unchanged,
/// otherwise `_<n>` goes before `.json`.
pub fn numbered(file_name: &str, n: u32) -> String {
    if n <= 1 {
        return file_name.to_string();
    }
    match file_name.strip_suffix(".json") {
        Some(stem) => format!("{stem}_{n}.json"),
        None => format!("{file_name}_{n}"),
    }
}

/// First numbered variant of `name` for which `taken` is false. Aggregate
/// names are returned as-is, since they are rewritten in place.
pub fn unique_file_name(name: &ArtifactName, taken: impl Fn(&str) -> bool) -> String {
    let base = file_name(name);
    if matches!(name, ArtifactName::Aggregate { .. }) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = numbered(&base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use promptforge_contracts::artifact::ArtifactName;

    use super::{file_name, numbered, sanitize_title, unique_file_name};

    #[test]
    fn aggregate_name_uses_prefix_and_run_start() {
        let name = ArtifactName::Aggregate {
            prefix: "characters".to_string(),
            started_at: Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap(),
        };
        assert_eq!(file_name(&name), "characters_20240309_070501.json");
    }

    #[test]
    fn titled_name_is_sanitized() {
        let name = ArtifactName::Titled {
            title: "Q3 Supplier Deal: Acme/Globex".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap(),
        };
        assert_eq!(
            file_name(&name),
            "Q3_Supplier_Deal__Acme_Globex_20241231_235959.json"
        );
    }

    #[test]
    fn sanitize_keeps_word_characters_and_hyphens() {
        assert_eq!(sanitize_title("mid-year_review"), "mid-year_review");
        assert_eq!(sanitize_title("a.b c"), "a_b_c");
        assert_eq!(sanitize_title("Café Übernahme"), "Café_Übernahme");
    }

    #[test]
    fn numbered_inserts_suffix_before_extension() {
        assert_eq!(numbered("Deal_20240501_120000.json", 1), "Deal_20240501_120000.json");
        assert_eq!(numbered("Deal_20240501_120000.json", 3), "Deal_20240501_120000_3.json");
    }

    #[test]
    fn taken_titled_name_gets_next_free_suffix() {
        let name = ArtifactName::Titled {
            title: "Deal".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        };
        let taken = ["Deal_20240501_120000.json", "Deal_20240501_120000_2.json"];

        assert_eq!(
            unique_file_name(&name, |candidate| taken.contains(&candidate)),
            "Deal_20240501_120000_3.json"
        );
    }

    #[test]
    fn aggregate_name_is_never_renumbered() {
        let name = ArtifactName::Aggregate {
            prefix: "characters".to_string(),
            started_at: Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap(),
        };
        assert_eq!(
            unique_file_name(&name, |_| true),
            "characters_20240309_070501.json"
        );
    }
}
