//! Reading and writing ffmpeg's `ffmetadata` text format.
//!
//! Only the global tags and `[CHAPTER]` sections are understood. Other
//! sections such as `[STREAM]` are skipped when reading and never written.

use std::fmt::Write;

use crate::chapters::{Chapter, EditedChapter};
use crate::clock::seconds_to_clock;
use crate::config::Config;
use crate::error::{ChapterError, Result};

pub const FFMETADATA_HEADER: &str = ";FFMETADATA1";

/// Timebase assumed by ffmpeg when a chapter omits `TIMEBASE` (nanoseconds).
pub const MISSING_TIMEBASE: u64 = 1_000_000_000;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FfMetadata {
    /// Global `key=value` lines found before the first section, kept escaped
    /// exactly as read.
    pub globals: Vec<String>,
    pub chapters: Vec<Chapter>,
}

#[derive(Default)]
struct PendingChapter {
    timebase: Option<u64>,
    start: Option<u64>,
    end: Option<u64>,
    title: Option<String>,
}

impl PendingChapter {
    fn apply(&mut self, line: &str) -> Result<()> {
        let Some((key, value)) = line.split_once('=') else {
            return Ok(());
        };

        match key {
            "TIMEBASE" => {
                let timebase = value
                    .strip_prefix("1/")
                    .and_then(|den| den.parse::<u64>().ok())
                    .filter(|den| *den > 0)
                    .ok_or_else(|| {
                        ChapterError::format(format!("unsupported chapter timebase \"{value}\""))
                    })?;
                self.timebase = Some(timebase);
            }
            "START" => self.start = Some(parse_ticks(key, value)?),
            "END" => self.end = Some(parse_ticks(key, value)?),
            "title" => self.title = Some(unescape(value)),
            _ => {}
        }
        Ok(())
    }

    fn finish(self, index: usize) -> Result<Chapter> {
        let start = self.start.ok_or_else(|| {
            ChapterError::format(format!("chapter {} has no START", index + 1))
        })?;
        let end = self.end.unwrap_or(start);
        if end < start {
            return Err(ChapterError::format(format!(
                "chapter {} ends at {end}, before its start at {start}",
                index + 1
            )));
        }

        Ok(Chapter {
            timebase: self.timebase.unwrap_or(MISSING_TIMEBASE),
            start,
            end,
            title: self.title.unwrap_or_default(),
        })
    }
}

fn parse_ticks(key: &str, value: &str) -> Result<u64> {
    value
        .parse::<u64>()
        .map_err(|_| ChapterError::format(format!("invalid chapter {key} \"{value}\"")))
}

enum Section {
    Global,
    Chapter(PendingChapter),
    Other,
}

/// Parses ffmetadata text. Chapters keep the order of their sections.
pub fn parse_ffmetadata(text: &str) -> Result<FfMetadata> {
    let mut metadata = FfMetadata::default();
    let mut section = Section::Global;

    for line in text.lines() {
        let line = line.trim();

        if line.starts_with('[') && line.ends_with(']') {
            if let Section::Chapter(pending) = std::mem::replace(&mut section, Section::Other) {
                let chapter = pending.finish(metadata.chapters.len())?;
                metadata.chapters.push(chapter);
            }
            if line == "[CHAPTER]" {
                section = Section::Chapter(PendingChapter::default());
            }
            continue;
        }

        match &mut section {
            Section::Global => {
                if !line.is_empty() && !line.starts_with(';') && !line.starts_with('#') {
                    metadata.globals.push(line.to_string());
                }
            }
            Section::Chapter(pending) => pending.apply(line)?,
            Section::Other => {}
        }
    }

    if let Section::Chapter(pending) = section {
        let chapter = pending.finish(metadata.chapters.len())?;
        metadata.chapters.push(chapter);
    }

    Ok(metadata)
}

/// Parses extracted metadata, adding the configured automatic chapter when the
/// file has no chapters at all.
pub fn decode_metadata(text: &str, duration: u64, config: &Config) -> Result<FfMetadata> {
    let mut metadata = parse_ffmetadata(text)?;
    log::debug!(
        "Decoded {} chapter(s) and {} global tag(s)",
        metadata.chapters.len(),
        metadata.globals.len()
    );

    if metadata.chapters.is_empty() {
        if let Some(title) = config.automatic_chapter() {
            log::info!("No chapters found, starting from a single \"{title}\" chapter");
            metadata
                .chapters
                .push(Chapter::spanning(title, duration, config.timebase));
        }
    }

    Ok(metadata)
}

/// Serializes edited chapters into ffmetadata text.
///
/// Each chapter ends where the next one starts and the last one ends with the
/// media. Nothing is returned unless every chapter passes validation.
pub fn encode_metadata(
    chapters: &[EditedChapter],
    duration: u64,
    timebase: u64,
    globals: &[String],
) -> Result<String> {
    let mut output = String::new();
    let _ = writeln!(&mut output, "{FFMETADATA_HEADER}");
    let _ = writeln!(&mut output);

    if !globals.is_empty() {
        for line in globals {
            let _ = writeln!(&mut output, "{line}");
        }
        let _ = writeln!(&mut output);
    }

    for (index, chapter) in chapters.iter().enumerate() {
        if chapter.start > duration {
            return Err(ChapterError::Validation(format!(
                "Chapter cannot start at {}, the video is only {} long",
                seconds_to_clock(chapter.start),
                seconds_to_clock(duration)
            )));
        }

        let end = match chapters.get(index + 1) {
            Some(next) if next.start < chapter.start => {
                return Err(ChapterError::Validation(format!(
                    "Chapter \"{}\" at {} starts before the previous chapter at {}",
                    next.title,
                    seconds_to_clock(next.start),
                    seconds_to_clock(chapter.start)
                )));
            }
            Some(next) => next.start,
            None => duration,
        };

        let to_ticks = |seconds: u64| {
            seconds.checked_mul(timebase).ok_or_else(|| {
                ChapterError::Validation(format!(
                    "{} cannot be expressed with timebase 1/{timebase}",
                    seconds_to_clock(seconds)
                ))
            })
        };

        let _ = writeln!(&mut output, "[CHAPTER]");
        let _ = writeln!(&mut output, "TIMEBASE=1/{timebase}");
        let _ = writeln!(&mut output, "START={}", to_ticks(chapter.start)?);
        let _ = writeln!(&mut output, "END={}", to_ticks(end)?);
        let _ = writeln!(&mut output, "title={}", escape(&chapter.title));
    }

    Ok(output)
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '=' | ';' | '#' | '\\' | '\n') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn unescape(value: &str) -> String {
    let mut unescaped = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                unescaped.push(next);
            }
        } else {
            unescaped.push(c);
        }
    }
    unescaped
}
