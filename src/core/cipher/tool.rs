//! External age backend.
//!
//! Runs the `age` and `age-keygen` binaries. Every invocation uses an
//! argument vector, never a shell string, and blocks until the tool exits;
//! a non-zero exit status is the only failure signal.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Output, Stdio};

use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::{is_age_encrypted, Cipher};
use crate::core::config::Tools;
use crate::core::types::{Ciphertext, PublicKey};
use crate::error::{CipherError, Result};

/// age via its command-line tools.
#[derive(Debug, Clone)]
pub struct AgeCli {
    age: String,
    age_keygen: String,
}

impl AgeCli {
    pub fn new(age: impl Into<String>, age_keygen: impl Into<String>) -> Self {
        Self {
            age: age.into(),
            age_keygen: age_keygen.into(),
        }
    }

    pub fn from_tools(tools: &Tools) -> Self {
        Self::new(&tools.age, &tools.age_keygen)
    }

    fn command(program: &str) -> Result<Command> {
        let path = which::which(program).map_err(|_| CipherError::ToolMissing(program.to_string()))?;
        Ok(Command::new(path))
    }
}

impl Cipher for AgeCli {
    fn name(&self) -> &'static str {
        "age-cli"
    }

    fn encrypt(&self, plaintext: &[u8], recipients_file: &Path) -> Result<Ciphertext> {
        let mut cmd = Self::command(&self.age)?;
        cmd.arg("-a").arg("--recipients-file").arg(recipients_file);

        let output = run(cmd, plaintext)?;
        if !output.status.success() {
            return Err(CipherError::EncryptionFailed(failure(&self.age, &output)).into());
        }
        Ok(output.stdout)
    }

    fn decrypt(&self, ciphertext: &[u8], identity_file: &Path) -> Result<Zeroizing<Vec<u8>>> {
        let mut cmd = Self::command(&self.age)?;
        cmd.arg("-d").arg("-i").arg(identity_file);

        let output = run(cmd, ciphertext)?;
        if !output.status.success() {
            return Err(CipherError::DecryptionFailed(failure(&self.age, &output)).into());
        }
        Ok(Zeroizing::new(output.stdout))
    }

    fn public_key(&self, identity_file: &Path) -> Result<PublicKey> {
        let cannot = |output: &Output| {
            CipherError::InvalidIdentity(format!(
                "can't get public key from identity {}: {}",
                identity_file.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        };

        let head = Zeroizing::new(std::fs::read(identity_file).map_err(|e| {
            CipherError::InvalidIdentity(format!("{}: {}", identity_file.display(), e))
        })?);

        let output = if is_age_encrypted(&head) {
            debug!(path = %identity_file.display(), "unlocking identity with age");
            let mut unlock = Self::command(&self.age)?;
            unlock.arg("-d").arg(identity_file);
            let unlocked = run(unlock, &[])?;
            if !unlocked.status.success() {
                return Err(cannot(&unlocked).into());
            }
            let plaintext = Zeroizing::new(unlocked.stdout);

            let mut keygen = Self::command(&self.age_keygen)?;
            keygen.arg("-y").arg("-");
            run(keygen, &plaintext)?
        } else {
            let mut keygen = Self::command(&self.age_keygen)?;
            keygen.arg("-y").arg(identity_file);
            run(keygen, &[])?
        };

        if !output.status.success() {
            return Err(cannot(&output).into());
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Run `cmd` to completion, feeding `input` on stdin and capturing stdout
/// and stderr.
///
/// Input is written from a separate thread so a tool that streams output
/// while still reading cannot deadlock on a full pipe.
fn run(mut cmd: Command, input: &[u8]) -> Result<Output> {
    trace!(command = ?cmd, input_len = input.len(), "spawning");

    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    let stdin = child.stdin.take();

    let (output, fed) = std::thread::scope(|scope| {
        let feeder = scope.spawn(move || match stdin {
            Some(mut stdin) => stdin.write_all(input),
            None => Ok(()),
        });
        let output = child.wait_with_output();
        let fed = feeder
            .join()
            .unwrap_or_else(|_| Err(io::Error::new(io::ErrorKind::Other, "stdin writer panicked")));
        (output, fed)
    });

    let output = output?;
    if output.status.success() {
        fed?;
    }
    trace!(status = ?output.status.code(), stdout_len = output.stdout.len(), "exited");
    Ok(output)
}

fn failure(program: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    match output.status.code() {
        Some(code) => format!("{} exited with status {}: {}", program, code, stderr.trim()),
        None => format!("{} terminated by signal: {}", program, stderr.trim()),
    }
}
