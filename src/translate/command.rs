use anyhow::{Context, Result};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;

use crate::core::error::ScanLayoutError;
use crate::translate::Translator;

/// Pipes the prompt into an external program and returns its stdout.
#[derive(Debug, Clone)]
pub struct CommandTranslator {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandTranslator {
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

impl Translator for CommandTranslator {
    fn complete(&self, prompt: &str) -> Result<String> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| {
                let err = match err.kind() {
                    io::ErrorKind::NotFound => {
                        anyhow::Error::new(ScanLayoutError::TranslatorUnavailable)
                    }
                    _ => anyhow::Error::new(err),
                };
                err.context(format!("failed to start translator {}", self.program.display()))
            })?;

        // stdin is written concurrently with draining stdout and stderr
        let stdin = child.stdin.take();
        let (written, output) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(prompt.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (writer.join(), output)
        });

        let output = output.with_context(|| "failed to read translator output")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("translator failed ({}): {stderr}", output.status);
        }
        match written {
            Ok(Ok(())) => {}
            // the program answered without consuming the whole prompt
            Ok(Err(err)) if err.kind() == io::ErrorKind::BrokenPipe => {}
            Ok(Err(err)) => return Err(err).context("failed to send prompt to translator"),
            Err(_) => anyhow::bail!("translator input writer panicked"),
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
