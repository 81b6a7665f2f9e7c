/// A chapter as read from the container, in its own timebase.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Chapter {
    /// Ticks per second.
    pub timebase: u64,
    pub start: u64,
    pub end: u64,
    pub title: String,
}

impl Chapter {
    /// A chapter covering the whole media, used when the file has none.
    pub fn spanning(title: impl Into<String>, duration: u64, timebase: u64) -> Self {
        Self {
            timebase,
            start: 0,
            end: duration.saturating_mul(timebase),
            title: title.into(),
        }
    }

    pub fn start_seconds(&self) -> u64 {
        self.start / self.timebase
    }

    pub fn end_seconds(&self) -> u64 {
        self.end / self.timebase
    }
}

/// A chapter after the user edited the display file. The end is derived from
/// whatever follows it when writing the metadata back.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditedChapter {
    pub title: String,
    /// Whole seconds.
    pub start: u64,
}

impl EditedChapter {
    pub fn new(title: impl Into<String>, start: u64) -> Self {
        Self {
            title: title.into(),
            start,
        }
    }
}

impl From<&Chapter> for EditedChapter {
    fn from(chapter: &Chapter) -> Self {
        Self::new(chapter.title.clone(), chapter.start_seconds())
    }
}
