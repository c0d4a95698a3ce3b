use std::ffi::OsStr;
use std::process::Command;

/// A `Command` for an external helper tool.
///
/// On Windows the child gets `CREATE_NO_WINDOW` so no console flashes up
/// while the TUI is running.
pub fn tool_command(program: impl AsRef<OsStr>) -> Command {
    #[allow(unused_mut)]
    let mut cmd = Command::new(program);

    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x0800_0000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }

    cmd
}

/// Last non-empty stderr line, used as the user-facing failure reason.
pub fn stderr_reason(stderr: &[u8]) -> String {
    String::from_utf8_lossy(stderr)
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(|l| l.trim_start_matches("ERROR:").trim().to_string())
        .unwrap_or_else(|| "downloader exited with an error".to_string())
}
