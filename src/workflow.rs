use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use crate::{
    chapters::{Chapter, EditedChapter},
    config::Config,
    display::{decode_display, encode_display},
    ffmetadata::{decode_metadata, encode_metadata},
    temp::{create_sibling_temp_file, create_temp_file},
    tools::{
        DurationProbe, Ffmpeg, Ffprobe, InteractiveEditor, MetadataExtractor, MetadataInjector,
        TerminalEditor,
    },
};

pub const BACKUP_SUFFIX: &str = ".old";

/// Probe, extract, let the user edit, validate, remux, then swap the new file
/// in place of the original. The original is only touched once every earlier
/// step succeeded, and is kept next to the result with a `.old` suffix.
pub struct ChapterEditor {
    config: Config,
    probe: Box<dyn DurationProbe>,
    extractor: Box<dyn MetadataExtractor>,
    injector: Box<dyn MetadataInjector>,
    editor: Box<dyn InteractiveEditor>,
}

impl ChapterEditor {
    /// Uses ffprobe, ffmpeg and the configured editor.
    pub fn new(config: Config) -> Self {
        let probe = Ffprobe::from_config(&config);
        let ffmpeg = Ffmpeg::from_config(&config);
        let editor = TerminalEditor::from_config(&config);
        Self::with_tools(
            config,
            Box::new(probe),
            Box::new(ffmpeg.clone()),
            Box::new(ffmpeg),
            Box::new(editor),
        )
    }

    pub fn with_tools(
        config: Config,
        probe: Box<dyn DurationProbe>,
        extractor: Box<dyn MetadataExtractor>,
        injector: Box<dyn MetadataInjector>,
        editor: Box<dyn InteractiveEditor>,
    ) -> Self {
        Self {
            config,
            probe,
            extractor,
            injector,
            editor,
        }
    }

    /// Runs the whole edit on `video` and returns the path of the backup.
    pub fn run(&self, video: &Path) -> Result<PathBuf> {
        self.config.validate()?;
        if !video.is_file() {
            anyhow::bail!("Input file does not exist: {}", video.display());
        }

        let duration = self.probe.duration(video)?;
        let extracted = self.extractor.extract_metadata(video)?;
        let metadata = decode_metadata(&extracted, duration, &self.config)
            .with_context(|| format!("Failed to read chapters of {}", video.display()))?;

        let edited = self.edit_chapters(video, &metadata.chapters)?;
        log::info!("{} chapter(s) after editing", edited.len());

        let globals: &[String] = if self.config.keep_global_metadata {
            &metadata.globals
        } else {
            &[]
        };
        let text = encode_metadata(&edited, duration, self.config.timebase, globals)?;

        let output = create_sibling_temp_file(video)?;
        self.injector.inject_metadata(video, &text, output.path())?;

        replace_with_backup(video, output)
    }

    /// Round-trips the chapters through the display file and the editor. The
    /// display file lives in its own temporary directory and is gone once this
    /// returns.
    fn edit_chapters(&self, video: &Path, chapters: &[Chapter]) -> Result<Vec<EditedChapter>> {
        let mut file_name = video
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| OsString::from("video"));
        file_name.push(".chapters.txt");

        let (_temp_dir, display_path) = create_temp_file(&file_name)?;
        fs::write(&display_path, encode_display(chapters)?)
            .with_context(|| format!("Failed to write {}", display_path.display()))?;

        self.editor.edit(&display_path)?;

        let edited = fs::read_to_string(&display_path)
            .with_context(|| format!("Failed to read {}", display_path.display()))?;
        Ok(decode_display(&edited)?)
    }
}

pub fn backup_path(video: &Path) -> PathBuf {
    let mut backup = video.as_os_str().to_os_string();
    backup.push(BACKUP_SUFFIX);
    PathBuf::from(backup)
}

/// Moves `video` to its backup name and `output` to `video`.
fn replace_with_backup(video: &Path, output: NamedTempFile) -> Result<PathBuf> {
    let permissions = fs::metadata(video)?.permissions();
    fs::set_permissions(output.path(), permissions)?;

    swap_with_backup(video, |target| {
        output.persist(target).map(|_| ()).map_err(|e| e.error)
    })
}

/// Renames `video` to its backup name, then lets `move_in` put the new file at
/// `video`. If `move_in` fails the original is moved back.
fn swap_with_backup(
    video: &Path,
    move_in: impl FnOnce(&Path) -> std::io::Result<()>,
) -> Result<PathBuf> {
    let backup = backup_path(video);
    fs::rename(video, &backup)
        .with_context(|| format!("Failed to move {} to {}", video.display(), backup.display()))?;

    if let Err(e) = move_in(video) {
        if let Err(restore) = fs::rename(&backup, video) {
            log::error!(
                "Could not restore {} from {}: {restore}",
                video.display(),
                backup.display()
            );
        }
        return Err(e).with_context(|| format!("Failed to replace {}", video.display()));
    }

    log::debug!("Kept original as {}", backup.display());
    Ok(backup)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_path() {
        assert_eq!(
            backup_path(Path::new("/videos/movie.mkv")),
            PathBuf::from("/videos/movie.mkv.old")
        );
        assert_eq!(backup_path(Path::new("clip")), PathBuf::from("clip.old"));
    }

    #[test]
    fn test_replace_with_backup() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("movie.mkv");
        fs::write(&video, b"old").unwrap();

        let output = create_sibling_temp_file(&video).unwrap();
        fs::write(output.path(), b"new").unwrap();

        let backup = replace_with_backup(&video, output).unwrap();
        assert_eq!(backup, dir.path().join("movie.mkv.old"));
        assert_eq!(fs::read(&video).unwrap(), b"new");
        assert_eq!(fs::read(&backup).unwrap(), b"old");
    }

    #[test]
    fn test_failed_swap_restores_original() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("movie.mkv");
        fs::write(&video, b"old").unwrap();

        let err = swap_with_backup(&video, |_| Err(std::io::Error::other("disk full")))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to replace"));

        assert_eq!(fs::read(&video).unwrap(), b"old");
        assert!(!backup_path(&video).exists());
    }
}
