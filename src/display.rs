//! The plain-text file handed to the user's editor: one `title<TAB>M:SS` line
//! per chapter.
//!
//! Lines without a tab are also accepted as `title M:SS`, in which case the
//! title cannot contain spaces.

use std::fmt::Write;

use crate::chapters::{Chapter, EditedChapter};
use crate::clock::{clock_to_seconds, seconds_to_clock};
use crate::error::{ChapterError, Result};

pub const FIELD_SEPARATOR: char = '\t';

pub fn encode_display(chapters: &[Chapter]) -> Result<String> {
    let mut output = String::new();
    for chapter in chapters {
        if chapter.title.contains([FIELD_SEPARATOR, '\n', '\r']) {
            return Err(ChapterError::format(format!(
                "chapter title {:?} contains a tab or line break and cannot be edited",
                chapter.title
            )));
        }
        let _ = writeln!(
            &mut output,
            "{}{FIELD_SEPARATOR}{}",
            chapter.title,
            seconds_to_clock(chapter.start_seconds())
        );
    }
    Ok(output)
}

pub fn decode_display(text: &str) -> Result<Vec<EditedChapter>> {
    let mut chapters = Vec::new();

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let (title, clock) = split_line(line).ok_or_else(|| {
            ChapterError::format(format!(
                "line {}: expected \"<title> <minutes:seconds>\", got {:?}",
                index + 1,
                line.trim()
            ))
        })?;

        chapters.push(EditedChapter::new(title, clock_to_seconds(clock)?));
    }

    Ok(chapters)
}

fn split_line(line: &str) -> Option<(&str, &str)> {
    if line.contains(FIELD_SEPARATOR) {
        let mut fields = line.split(FIELD_SEPARATOR);
        return match (fields.next(), fields.next(), fields.next()) {
            (Some(title), Some(clock), None) if !clock.trim().is_empty() => {
                Some((title.trim(), clock.trim()))
            }
            _ => None,
        };
    }

    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(title), Some(clock), None) => Some((title, clock)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(title: &str, start_seconds: u64) -> Chapter {
        Chapter {
            timebase: 1000,
            start: start_seconds * 1000,
            end: start_seconds * 1000,
            title: title.to_string(),
        }
    }

    #[test]
    fn test_encode_display() {
        let chapters = [chapter("Intro", 0), chapter("Main part", 125)];
        assert_eq!(
            encode_display(&chapters).unwrap(),
            "Intro\t0:00\nMain part\t2:05\n"
        );
    }

    #[test]
    fn test_encode_rejects_separator_in_title() {
        let err = encode_display(&[chapter("a\tb", 0)]).unwrap_err();
        assert!(matches!(err, ChapterError::Format(_)));
    }

    #[test]
    fn test_decode_display() {
        let text = "Intro\t0:00\n\n   \nMain part\t2:05\nOutro 3:10\n";
        assert_eq!(
            decode_display(text).unwrap(),
            vec![
                EditedChapter::new("Intro", 0),
                EditedChapter::new("Main part", 125),
                EditedChapter::new("Outro", 190),
            ]
        );
    }

    #[test]
    fn test_decode_rejects_three_tokens() {
        let err = decode_display("Main part 2:05\n").unwrap_err();
        assert!(matches!(err, ChapterError::Format(_)));
    }

    #[test]
    fn test_decode_rejects_missing_clock() {
        for text in ["Intro\n", "Intro\t\n", "a\tb\t1:00\n"] {
            assert!(
                matches!(decode_display(text), Err(ChapterError::Format(_))),
                "{text:?}"
            );
        }
    }

    #[test]
    fn test_decode_rejects_bad_clock() {
        let err = decode_display("Intro\t1m30\n").unwrap_err();
        assert!(matches!(err, ChapterError::Format(_)));
    }

    #[test]
    fn test_display_round_trip() {
        let chapters = [chapter("Cold open", 0), chapter("Act 1", 61), chapter("#2", 3600)];
        let edited = decode_display(&encode_display(&chapters).unwrap()).unwrap();
        let expected: Vec<EditedChapter> = chapters.iter().map(EditedChapter::from).collect();
        assert_eq!(edited, expected);
    }
}
