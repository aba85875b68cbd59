use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::Context;

/// Copy `text` to the system clipboard, trying each known clipboard tool in turn.
pub(crate) fn copy(text: &str) -> anyhow::Result<()> {
    let mut last_err = anyhow::anyhow!("no clipboard command is available on this platform");
    for mut cmd in clipboard_cmds() {
        match send_to(&mut cmd, text.as_bytes()) {
            Ok(()) => return Ok(()),
            Err(err) => last_err = err,
        }
    }
    Err(last_err)
}

fn send_to(cmd: &mut Command, data: &[u8]) -> anyhow::Result<()> {
    let program = cmd.get_program().to_string_lossy().into_owned();
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to start `{program}`"))?;
    {
        let mut stdin = child
            .stdin
            .take()
            .with_context(|| format!("`{program}` has no stdin"))?;
        stdin
            .write_all(data)
            .with_context(|| format!("failed to write to `{program}`"))?;
    }
    let status = child
        .wait()
        .with_context(|| format!("failed to wait for `{program}`"))?;
    if !status.success() {
        anyhow::bail!("`{program}` exited with {status}");
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn clipboard_cmds() -> Vec<Command> {
    vec![Command::new("pbcopy")]
}

#[cfg(not(target_os = "macos"))]
fn clipboard_cmds() -> Vec<Command> {
    let mut xclip = Command::new("xclip");
    xclip.args(["-selection", "clipboard"]);
    let mut xsel = Command::new("xsel");
    xsel.arg("-b");
    vec![xclip, xsel]
}
