//! The interactive command loop.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::console::{Console, Tone};
use crate::dirs::DirectorySet;
use crate::error::RandPathError;
use crate::opener::Opener;
use crate::picker::RandomPicker;
use crate::scan::{self, FileRecord};

const NO_CLUE: &str = "[!!!] I have no idea where to look! Be my guest, give me a clue!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Pick,
    NewDir,
    RemoveDir,
    ViewDir,
    Open,
    Help,
    Exit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Self::Pick,
            "newdir" => Self::NewDir,
            "removedir" => Self::RemoveDir,
            "viewdir" => Self::ViewDir,
            "open" => Self::Open,
            "help" => Self::Help,
            "exit" => Self::Exit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// Lines typed by the user, read on a dedicated thread so the loop can
/// keep checking for shutdown while nobody is typing.
pub struct InputLines {
    rx: Receiver<String>,
    poll: Duration,
}

impl InputLines {
    pub fn stdin(poll: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("stdin-reader".to_string())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    match line {
                        Ok(line) => {
                            if tx.send(line).is_err() {
                                break;
                            }
                        }
                        Err(err) => {
                            tracing::warn!("Could not read input: {}", err);
                            break;
                        }
                    }
                }
            });
        if let Err(err) = spawned {
            tracing::error!("Could not start input reader: {}", err);
        }
        Self { rx, poll }
    }

    /// Pre-recorded input; reports end of input once exhausted.
    pub fn from_lines<I, S>(lines: I, poll: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let (tx, rx) = mpsc::channel();
        for line in lines {
            let _ = tx.send(line.into());
        }
        Self { rx, poll }
    }

    /// Next line, or `None` on end of input or cancellation.
    pub fn next_line(&self, cancel: &CancellationToken) -> Option<String> {
        while !cancel.is_cancelled() {
            match self.rx.recv_timeout(self.poll) {
                Ok(line) => return Some(line),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => return None,
            }
        }
        None
    }
}

/// Process-lifetime state the commands share.
#[derive(Debug, Default)]
pub struct Session {
    last_shown: Option<FileRecord>,
}

impl Session {
    pub fn record(&mut self, file: FileRecord) {
        self.last_shown = Some(file);
    }

    pub fn last_shown(&self) -> Option<&FileRecord> {
        self.last_shown.as_ref()
    }
}

pub struct CommandLoop<W: Write> {
    dirs: DirectorySet,
    picker: RandomPicker,
    opener: Opener,
    session: Session,
    console: Console<W>,
    cancel: CancellationToken,
}

impl<W: Write> CommandLoop<W> {
    pub fn new(
        dirs: DirectorySet,
        picker: RandomPicker,
        opener: Opener,
        console: Console<W>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            dirs,
            picker,
            opener,
            session: Session::default(),
            console,
            cancel,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn directories(&self) -> &DirectorySet {
        &self.dirs
    }

    pub fn into_output(self) -> W {
        self.console.into_inner()
    }

    /// Read and run commands until `exit`, end of input or cancellation.
    pub fn run(&mut self, input: &InputLines) -> io::Result<()> {
        self.greet()?;

        while !self.cancel.is_cancelled() {
            self.console.prompt(">>> ")?;

            let Some(line) = input.next_line(&self.cancel) else {
                self.console.line(Tone::Plain, "")?;
                break;
            };

            match Command::parse(&line) {
                Command::Pick => self.show_random()?,
                Command::NewDir => {
                    self.console.prompt("Enter directory path: ")?;
                    let Some(path) = input.next_line(&self.cancel) else {
                        break;
                    };
                    self.add_dir(&path)?;
                }
                Command::RemoveDir => {
                    if self.dirs.is_empty() {
                        self.console.line(Tone::Error, "[!!!] No directories to remove.")?;
                        continue;
                    }
                    self.console.line(Tone::Plain, "Saved directories:")?;
                    for (i, dir) in self.dirs.list().iter().enumerate() {
                        self.console.line(Tone::Plain, &format!("{}. {}", i + 1, dir))?;
                    }
                    self.console.prompt("Enter index or path to remove: ")?;
                    let Some(selector) = input.next_line(&self.cancel) else {
                        break;
                    };
                    self.remove_dir(&selector)?;
                }
                Command::ViewDir => self.view_dirs()?,
                Command::Open => self.open_last()?,
                Command::Help => self.help()?,
                Command::Exit => {
                    self.console.line(Tone::Plain, "Farewell.")?;
                    self.cancel.cancel();
                }
                Command::Unknown(other) => {
                    tracing::debug!("Unknown command: {}", other);
                    self.console.line(Tone::Plain, "Unknown command.")?;
                }
            }
        }

        Ok(())
    }

    fn greet(&mut self) -> io::Result<()> {
        self.console.line(Tone::Banner, "randpath - random file displayer")?;
        self.console.line(Tone::Plain, "Press Enter to display a random file.")?;
        self.console.line(
            Tone::Plain,
            "Type 'newdir', 'removedir', 'viewdir', 'open', 'help', or 'exit' to quit.",
        )?;
        self.console.line(Tone::Plain, "")?;
        if self.dirs.is_empty() {
            self.console.line(Tone::Error, NO_CLUE)?;
        }
        Ok(())
    }

    fn show_random(&mut self) -> io::Result<()> {
        // The list may have been edited by hand since the last command
        self.dirs.reload();
        let scan = scan::enumerate(self.dirs.list());

        match self.picker.pick(&scan.files) {
            Ok(file) => {
                let file = file.clone();
                self.console.line(Tone::Path, &file.to_string())?;
                self.session.record(file);
            }
            Err(_) => self.console.line(Tone::Error, NO_CLUE)?,
        }
        Ok(())
    }

    fn add_dir(&mut self, raw: &str) -> io::Result<()> {
        match self.dirs.add(raw) {
            Ok(dir) => {
                let message = format!("[+] Added: {}", dir);
                self.console.line(Tone::Success, &message)
            }
            Err(RandPathError::Validation { .. }) => self
                .console
                .line(Tone::Error, "Invalid directory path or path not found."),
            Err(RandPathError::Duplicate(_)) => {
                self.console.line(Tone::Error, "Directory already in list.")
            }
            Err(err) => self.console.line(Tone::Error, &err.to_string()),
        }
    }

    fn remove_dir(&mut self, selector: &str) -> io::Result<()> {
        match self.dirs.remove(selector) {
            Ok(removed) => self
                .console
                .line(Tone::Error, &format!("Removed: {}", removed)),
            Err(RandPathError::NotFound(_)) => self
                .console
                .line(Tone::Plain, "Invalid index or directory not found in list."),
            Err(err) => self.console.line(Tone::Error, &err.to_string()),
        }
    }

    fn view_dirs(&mut self) -> io::Result<()> {
        self.dirs.reload();
        if self.dirs.is_empty() {
            return self.console.line(Tone::Error, "[!!!] No directories saved yet.");
        }
        self.console.line(Tone::Banner, "Saved directories:")?;
        for dir in self.dirs.list() {
            self.console.line(Tone::Plain, &format!(" - {}", dir))?;
        }
        Ok(())
    }

    fn open_last(&mut self) -> io::Result<()> {
        let Some(file) = self.session.last_shown() else {
            return self.console.line(
                Tone::Warning,
                "No file has been displayed yet. Press Enter first.",
            );
        };

        match self.opener.open(file) {
            Ok(()) => {
                let message = format!("Opening: {}", file);
                self.console.line(Tone::Success, &message)
            }
            Err(RandPathError::FileGone(path)) => self.console.line(
                Tone::Error,
                &format!(
                    "File not found. It may have been moved or deleted: {}",
                    path.display()
                ),
            ),
            Err(err) => self
                .console
                .line(Tone::Error, &format!("Failed to open file. {}", err)),
        }
    }

    fn help(&mut self) -> io::Result<()> {
        let lines = [
            "  <Enter>     show a random file from the saved directories",
            "  newdir      add a directory",
            "  removedir   remove a directory by number or path",
            "  viewdir     list saved directories",
            "  open        open the last shown file with its default application",
            "  exit        quit",
        ];
        for line in lines {
            self.console.line(Tone::Plain, line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse(""), Command::Pick);
        assert_eq!(Command::parse("newdir"), Command::NewDir);
        assert_eq!(Command::parse("exit\r"), Command::Exit);
        assert_eq!(Command::parse("dance"), Command::Unknown("dance".to_string()));
    }

    #[test]
    fn test_input_lines_end_and_cancel() {
        let cancel = CancellationToken::new();
        let input = InputLines::from_lines(["one"], Duration::from_millis(10));

        assert_eq!(input.next_line(&cancel).as_deref(), Some("one"));
        assert_eq!(input.next_line(&cancel), None);

        let input = InputLines::from_lines(["two"], Duration::from_millis(10));
        cancel.cancel();
        assert_eq!(input.next_line(&cancel), None);
    }

    #[test]
    fn test_session_keeps_latest_pick() {
        let mut session = Session::default();
        assert!(session.last_shown().is_none());

        session.record(FileRecord::new("/a"));
        session.record(FileRecord::new("/b"));
        assert_eq!(session.last_shown(), Some(&FileRecord::new("/b")));
    }
}
