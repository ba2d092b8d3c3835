//! Turns a bare rip file name such as `Kill Bill (2003) part 1.mkv` into a
//! [`MovieRip`] carrying title, release year and extension.

use crate::models::{MovieRip, ReleaseYear};
use once_cell::sync::Lazy;
use regex::Regex;

// title, then either "(yyyy)" and whatever trails it, or an optional ".ext"
static FILENAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<title>[A-Za-z0-9\s\-',!\[\].]+?)\s*(?:\((?P<year>[0-9]{4})\)(?P<tail>.*)|(?P<ext>\.[^.]*)?)$",
    )
    .expect("rip filename regex should compile")
});

/// Outcome of matching a file name against the rip naming pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilenameMatch<'a> {
    Matched {
        title: &'a str,
        year: Option<&'a str>,
        /// Everything after the title (and year): extension, maybe with a qualifier in front.
        tail: &'a str,
    },
    Unmatched,
}

pub fn match_filename(file_name: &str) -> FilenameMatch<'_> {
    let Some(caps) = FILENAME_PATTERN.captures(file_name) else {
        return FilenameMatch::Unmatched;
    };
    let Some(title) = caps.name("title") else {
        return FilenameMatch::Unmatched;
    };
    let tail = caps
        .name("tail")
        .or_else(|| caps.name("ext"))
        .map(|m| m.as_str())
        .unwrap_or("");
    FilenameMatch::Matched {
        title: title.as_str(),
        year: caps.name("year").map(|m| m.as_str()),
        tail,
    }
}

/// Lower-cased extension including the leading dot, or empty when the name has none.
pub fn extension_of(file_name: &str) -> String {
    match file_name.rfind('.') {
        Some(idx) if idx + 1 < file_name.len() => file_name[idx..].to_lowercase(),
        _ => String::new(),
    }
}

fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) => &file_name[..idx],
        None => file_name,
    }
}

/// Parses title, year and extension from a file name. Genres, size and
/// parent folder are left for the scanner to fill in.
pub fn parse(file_name: &str) -> MovieRip {
    let extension = extension_of(file_name);
    let (title, year) = build_title(file_name, match_filename(file_name), &extension);
    MovieRip::new(title, year, extension)
}

fn build_title(
    file_name: &str,
    matched: FilenameMatch<'_>,
    extension: &str,
) -> (String, ReleaseYear) {
    match matched {
        FilenameMatch::Matched { title, year, tail } => {
            let year = year
                .and_then(|y| y.parse::<u16>().ok())
                .map(ReleaseYear::new)
                .unwrap_or(ReleaseYear::UNKNOWN);
            let mut title = title.trim().to_string();
            if !tail.is_empty() && !tail.eq_ignore_ascii_case(extension) {
                title.push_str(qualifier_of(tail, extension));
                title = title.trim().to_string();
            }
            (title, year)
        }
        FilenameMatch::Unmatched => {
            (strip_extension(file_name).to_string(), ReleaseYear::UNKNOWN)
        }
    }
}

fn qualifier_of<'a>(tail: &'a str, extension: &str) -> &'a str {
    let cut = tail.len().saturating_sub(extension.len());
    if !extension.is_empty()
        && tail.is_char_boundary(cut)
        && tail[cut..].eq_ignore_ascii_case(extension)
    {
        &tail[..cut]
    } else {
        tail
    }
}
