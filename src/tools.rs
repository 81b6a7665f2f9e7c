//! External programs the workflow depends on.
//!
//! Each capability is a trait so the chapter logic can run against fakes; the
//! implementations here shell out to ffprobe, ffmpeg and the user's editor.

use std::{
    fs,
    path::{Path, PathBuf},
    process::{Command, Output, Stdio},
};

use serde::Deserialize;

use crate::config::Config;
use crate::error::{ChapterError, Result};
use crate::temp::create_temp_file;

pub trait DurationProbe {
    /// Total media duration in whole seconds.
    fn duration(&self, video: &Path) -> Result<u64>;
}

pub trait MetadataExtractor {
    /// The file's metadata as ffmetadata text.
    fn extract_metadata(&self, video: &Path) -> Result<String>;
}

pub trait MetadataInjector {
    /// Writes a copy of `video` to `output` with `metadata` applied. Streams
    /// are copied, never re-encoded.
    fn inject_metadata(&self, video: &Path, metadata: &str, output: &Path) -> Result<()>;
}

pub trait InteractiveEditor {
    /// Blocks until the user is done editing `path`.
    fn edit(&self, path: &Path) -> Result<()>;
}

fn tool_name(binary: &Path) -> String {
    binary
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| binary.display().to_string())
}

fn run(binary: &Path, command: &mut Command, video: &Path) -> Result<Output> {
    let tool = tool_name(binary);
    log::debug!("Running {command:?}");

    let output = command
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ChapterError::process(&tool, video, format!("could not start: {e}")))?;

    let status = output.status;
    if !status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::debug!("stdout\n{}", String::from_utf8_lossy(&output.stdout));
        log::debug!("stderr\n{stderr}");

        let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty());
        let reason = match last_line {
            Some(line) => format!("{status}: {}", line.trim()),
            None => status.to_string(),
        };
        return Err(ChapterError::process(tool, video, reason));
    }

    Ok(output)
}

#[derive(Debug, Clone)]
pub struct Ffprobe {
    binary: PathBuf,
}

#[derive(Deserialize)]
struct ProbeOutput {
    format: ProbeFormat,
}

#[derive(Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

impl Ffprobe {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.ffprobe)
    }
}

fn parse_probe_duration(json: &[u8]) -> Option<u64> {
    let probe: ProbeOutput = serde_json::from_slice(json).ok()?;
    let seconds = probe.format.duration?.trim().parse::<f64>().ok()?;
    (seconds.is_finite() && seconds >= 0.0).then(|| seconds as u64)
}

impl DurationProbe for Ffprobe {
    fn duration(&self, video: &Path) -> Result<u64> {
        let mut command = Command::new(&self.binary);
        command
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "json"])
            .arg("-i")
            .arg(video);

        let output = run(&self.binary, &mut command, video)?;
        let duration = parse_probe_duration(&output.stdout).ok_or_else(|| {
            ChapterError::process(
                tool_name(&self.binary),
                video,
                "did not report a duration",
            )
        })?;

        log::info!("Duration of {} is {duration}s", video.display());
        Ok(duration)
    }
}

#[derive(Debug, Clone)]
pub struct Ffmpeg {
    binary: PathBuf,
}

impl Ffmpeg {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.ffmpeg)
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.binary);
        command.args(["-nostdin", "-hide_banner", "-loglevel", "error", "-y"]);
        command
    }
}

impl MetadataExtractor for Ffmpeg {
    fn extract_metadata(&self, video: &Path) -> Result<String> {
        let (_temp_dir, meta_in) = create_temp_file("meta_in.ini")?;

        log::info!(
            "Extracting metadata \"{}\" to \"{}\"",
            video.display(),
            meta_in.display()
        );

        let mut command = self.command();
        command
            .arg("-i")
            .arg(video)
            .args(["-f", "ffmetadata"])
            .arg(&meta_in);
        run(&self.binary, &mut command, video)?;

        Ok(fs::read_to_string(&meta_in)?)
    }
}

impl MetadataInjector for Ffmpeg {
    fn inject_metadata(&self, video: &Path, metadata: &str, output: &Path) -> Result<()> {
        let (_temp_dir, meta_out) = create_temp_file("meta_out.ini")?;
        fs::write(&meta_out, metadata)?;

        log::info!(
            "Writing \"{}\" with chapters from \"{}\"",
            output.display(),
            meta_out.display()
        );

        let mut command = self.command();
        command
            .arg("-i")
            .arg(video)
            .arg("-i")
            .arg(&meta_out)
            .args([
                "-map",
                "0",
                "-map_metadata",
                "1",
                "-map_chapters",
                "1",
                "-codec",
                "copy",
            ])
            .arg(output);
        run(&self.binary, &mut command, video)?;

        Ok(())
    }
}

/// Runs the configured editor command with the file appended as its last
/// argument, e.g. `code --wait` or `vim`. A command naming an existing file is
/// run as a single program even if its path contains spaces.
#[derive(Debug, Clone)]
pub struct TerminalEditor {
    command: String,
}

impl TerminalEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.editor.clone())
    }

    fn program_and_args(&self) -> Option<(&str, Vec<&str>)> {
        let command = self.command.trim();
        if command.is_empty() {
            return None;
        }
        if Path::new(command).is_file() {
            return Some((command, Vec::new()));
        }

        let mut parts = command.split_whitespace();
        let program = parts.next()?;
        Some((program, parts.collect()))
    }
}

impl InteractiveEditor for TerminalEditor {
    fn edit(&self, path: &Path) -> Result<()> {
        let (program, args) = self
            .program_and_args()
            .ok_or_else(|| ChapterError::process("editor", path, "no editor configured"))?;

        log::debug!("Opening {} with {}", path.display(), self.command);
        let status = Command::new(program)
            .args(args)
            .arg(path)
            .status()
            .map_err(|e| ChapterError::process(program, path, format!("could not start: {e}")))?;

        if !status.success() {
            return Err(ChapterError::process(
                program,
                path,
                format!("exited with {status}, keeping the original chapters"),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_probe_duration() {
        let json = br#"{ "format": { "duration": "1337.912000" } }"#;
        assert_eq!(parse_probe_duration(json), Some(1337));
    }

    #[test]
    fn test_parse_probe_duration_missing() {
        assert_eq!(parse_probe_duration(br#"{ "format": {} }"#), None);
        assert_eq!(parse_probe_duration(br#"{ "format": { "duration": "N/A" } }"#), None);
        assert_eq!(parse_probe_duration(b"not json"), None);
    }

    #[test]
    fn test_missing_binary_is_process_error() {
        let ffprobe = Ffprobe::new("/nonexistent/ffprobe-binary");
        let err = ffprobe.duration(Path::new("movie.mkv")).unwrap_err();
        assert!(matches!(err, ChapterError::Process { .. }));
        assert!(err.to_string().contains("ffprobe-binary"));
    }

    #[cfg(unix)]
    #[test]
    fn test_editor_failure_is_process_error() {
        let editor = TerminalEditor::new("false");
        let err = editor.edit(Path::new("chapters.txt")).unwrap_err();
        assert!(matches!(err, ChapterError::Process { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_editor_receives_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chapters.txt");
        // `touch` stands in for an editor that saves the file.
        TerminalEditor::new("touch").edit(&path).unwrap();
        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_editor_command_with_arguments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chapters.txt");
        TerminalEditor::new("touch -a").edit(&path).unwrap();
        assert!(path.exists());

        let editor = TerminalEditor::new(" code  --wait ");
        assert_eq!(editor.program_and_args(), Some(("code", vec!["--wait"])));
        assert_eq!(TerminalEditor::new("  ").program_and_args(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_editor_path_with_spaces() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let bin_dir = dir.path().join("Sublime Text.app");
        fs::create_dir(&bin_dir).unwrap();
        let script = bin_dir.join("subl");
        fs::write(&script, "#!/bin/sh\ntouch \"$1\"\n").unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

        let path = dir.path().join("chapters.txt");
        let editor = TerminalEditor::new(script.to_string_lossy());
        editor.edit(&path).unwrap();
        assert!(path.exists());
    }
}
