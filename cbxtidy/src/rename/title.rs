//! Title-case renaming
//!
//! English title-case heuristic: every word is capitalized except small
//! connective words in the interior; the first and last words always get a
//! capital. Words that already carry interior capitals or digits ("iPhone",
//! "v12", "OVA") are left untouched. Directories are renamed whole; files
//! keep their extension and only the stem changes.

use std::path::{Path, PathBuf};

use crate::rename::{rename_checked, RenameOutcome};
use crate::utils::error::Result;

/// Words kept lowercase in the interior of a title
const SMALL_WORDS: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "en", "for", "if", "in", "nor", "of", "on", "or",
    "per", "the", "to", "via", "vs",
];

/// Apply the title-case heuristic to one name
pub fn title_case(input: &str) -> String {
    let words: Vec<&str> = input.split(' ').collect();
    let last = words.len().saturating_sub(1);

    words
        .iter()
        .enumerate()
        .map(|(i, word)| {
            if word.is_empty() || keeps_own_casing(word) {
                return (*word).to_string();
            }
            let lower = word.to_lowercase();
            if i != 0 && i != last && SMALL_WORDS.contains(&lower.as_str()) {
                lower
            } else {
                capitalize(&lower)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Mixed-case and numbered words are assumed intentional
fn keeps_own_casing(word: &str) -> bool {
    word.chars().skip(1).any(|c| c.is_uppercase()) || word.chars().any(|c| c.is_ascii_digit())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Compute the title-cased path, or `None` when the name is already right
///
/// `is_dir` decides whether the extension is protected from casing.
pub fn title_case_target(path: &Path, is_dir: bool) -> Option<PathBuf> {
    if is_dir {
        let name = path.file_name()?.to_str()?;
        let cased = title_case(name);
        if cased == name {
            return None;
        }
        return Some(path.with_file_name(cased));
    }

    let stem = path.file_stem()?.to_str()?;
    let cased = title_case(stem);
    if cased == stem {
        return None;
    }
    let new_name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}", cased, ext),
        None => cased,
    };
    Some(path.with_file_name(new_name))
}

/// Rename one file or directory to title case
pub fn rename_title_case(path: &Path) -> Result<RenameOutcome> {
    if !path.exists() {
        return Ok(RenameOutcome::Skipped {
            reason: "no such path".to_string(),
        });
    }

    match title_case_target(path, path.is_dir()) {
        Some(target) => rename_checked(path, &target),
        None => Ok(RenameOutcome::Unchanged),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_small_words_stay_lowercase() {
        assert_eq!(
            title_case("the fall of the house of usher"),
            "The Fall of the House of Usher"
        );
    }

    #[test]
    fn test_first_and_last_always_capitalized() {
        assert_eq!(title_case("of mice and men"), "Of Mice and Men");
        assert_eq!(title_case("something to believe in"), "Something to Believe In");
    }

    #[test]
    fn test_mixed_case_words_left_alone() {
        assert_eq!(title_case("iPhone user guide"), "iPhone User Guide");
        assert_eq!(title_case("akira OVA collection"), "Akira OVA Collection");
    }

    #[test]
    fn test_numbered_tokens_left_alone() {
        assert_eq!(title_case("berserk v12 deluxe"), "Berserk v12 Deluxe");
    }

    #[test]
    fn test_file_keeps_extension() {
        assert_eq!(
            title_case_target(Path::new("/tmp/the dark knight.cbz"), false),
            Some(PathBuf::from("/tmp/The Dark Knight.cbz"))
        );
    }

    #[test]
    fn test_directory_renamed_whole() {
        assert_eq!(
            title_case_target(Path::new("/tmp/collected works"), true),
            Some(PathBuf::from("/tmp/Collected Works"))
        );
    }

    #[test]
    fn test_already_cased_is_none() {
        assert_eq!(title_case_target(Path::new("/tmp/The Dark Knight.cbz"), false), None);
    }

    #[test]
    fn test_rename_on_disk() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("the dark knight.cbz");
        std::fs::write(&src, b"zip").unwrap();

        let outcome = rename_title_case(&src).unwrap();
        assert_eq!(
            outcome,
            RenameOutcome::Renamed {
                to: dir.path().join("The Dark Knight.cbz")
            }
        );
    }

    #[test]
    fn test_rename_directory() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("collected works");
        std::fs::create_dir(&src).unwrap();

        let outcome = rename_title_case(&src).unwrap();
        assert_eq!(
            outcome,
            RenameOutcome::Renamed {
                to: dir.path().join("Collected Works")
            }
        );
    }
}
