use std::io::Write;
use std::process::{Command, Stdio};

use log::{debug, warn};

use crate::error::ClipboardError;

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// System clipboard using arboard, opened on first use.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self { inner: None }
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if self.inner.is_none() {
            self.inner = Some(arboard::Clipboard::new()?);
        }
        if let Some(clipboard) = self.inner.as_mut() {
            clipboard.set_text(text.to_string())?;
        }
        Ok(())
    }
}

/// Pipes text into the first platform copy command that runs.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    candidates: Vec<Vec<String>>,
}

impl Default for CommandClipboard {
    fn default() -> Self {
        let c = |args: &[&str]| args.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            candidates: vec![
                c(&["pbcopy"]),
                c(&["wl-copy"]),
                c(&["xclip", "-selection", "clipboard"]),
                c(&["xsel", "-b", "-i"]),
                c(&["clip"]),
            ],
        }
    }
}

impl CommandClipboard {
    pub fn with_commands(candidates: Vec<Vec<String>>) -> Self {
        Self { candidates }
    }

    fn run(argv: &[String], text: &str) -> Result<(), ClipboardError> {
        let (program, args) = argv.split_first().ok_or(ClipboardError::NoCommand)?;
        let failed = |reason: String| ClipboardError::Command {
            command: program.clone(),
            reason,
        };
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| failed(e.to_string()))?;
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(text.as_bytes()) {
                drop(stdin);
                // reap the child before reporting
                let _ = child.kill();
                let _ = child.wait();
                return Err(failed(e.to_string()));
            }
        }
        let status = child.wait().map_err(|e| failed(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(failed(format!("exit status {status}")))
        }
    }
}

impl Clipboard for CommandClipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        let mut last = ClipboardError::NoCommand;
        for argv in &self.candidates {
            match Self::run(argv, text) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    debug!("clipboard command skipped: {e}");
                    last = e;
                }
            }
        }
        Err(last)
    }
}

/// Tries `primary`, then `fallback`; reports whether either succeeded.
pub fn copy_with_fallback(
    primary: &mut dyn Clipboard,
    fallback: &mut dyn Clipboard,
    text: &str,
) -> bool {
    match primary.set_text(text) {
        Ok(()) => true,
        Err(e) => {
            warn!("primary clipboard failed, trying fallback: {e}");
            match fallback.set_text(text) {
                Ok(()) => true,
                Err(e) => {
                    warn!("fallback clipboard failed: {e}");
                    false
                }
            }
        }
    }
}

/// Primary system clipboard with the command fallback.
#[derive(Default)]
pub struct ClipboardPair {
    pub primary: SystemClipboard,
    pub fallback: CommandClipboard,
}

impl ClipboardPair {
    pub fn copy(&mut self, text: &str) -> bool {
        copy_with_fallback(&mut self.primary, &mut self.fallback, text)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::FakeClipboard;
    use super::*;

    #[test]
    fn primary_success_skips_fallback() {
        let mut p = FakeClipboard::default();
        let mut f = FakeClipboard::default();
        assert!(copy_with_fallback(&mut p, &mut f, "hi"));
        assert_eq!(p.contents.as_deref(), Some("hi"));
        assert!(f.contents.is_none());
    }

    #[test]
    fn fallback_used_when_primary_fails() {
        let mut p = FakeClipboard {
            fail: true,
            ..Default::default()
        };
        let mut f = FakeClipboard::default();
        assert!(copy_with_fallback(&mut p, &mut f, "hi"));
        assert_eq!(f.contents.as_deref(), Some("hi"));
    }

    #[test]
    fn both_failing_reports_false() {
        let mut p = FakeClipboard {
            fail: true,
            ..Default::default()
        };
        let mut f = FakeClipboard {
            fail: true,
            ..Default::default()
        };
        assert!(!copy_with_fallback(&mut p, &mut f, "hi"));
    }

    #[cfg(unix)]
    #[test]
    fn command_exit_status_decides_success() {
        let argv = |a: &[&str]| a.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        let mut ok = CommandClipboard::with_commands(vec![argv(&["sh", "-c", "cat > /dev/null"])]);
        assert!(ok.set_text("hi").is_ok());
        let mut bad = CommandClipboard::with_commands(vec![argv(&["false"])]);
        assert!(bad.set_text("hi").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn reader_that_quits_early_is_a_failure() {
        let mut c = CommandClipboard::with_commands(vec![vec!["true".into()]]);
        let big = "x".repeat(1 << 20);
        assert!(matches!(
            c.set_text(&big),
            Err(ClipboardError::Command { .. })
        ));
    }

    #[test]
    fn missing_commands_fail_cleanly() {
        let mut c = CommandClipboard::with_commands(vec![
            vec!["qbank-definitely-not-a-command".into()],
            vec![],
        ]);
        assert!(c.set_text("hi").is_err());
    }
}
