use std::io;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use anyhow::Result;
use crate::config::Config;
use crate::model::Entry;

/// Full argv for launching `entry`, wrapped in the configured terminal when
/// the entry asks for one.
pub fn command_line(entry: &Entry, config: &Config) -> Vec<String> {
    let mut direct = Vec::with_capacity(entry.arguments.len() + 1);
    direct.push(entry.command.clone());
    direct.extend(entry.arguments.iter().cloned());

    if !entry.is_terminal_command {
        return direct;
    }

    let template: Vec<&str> = config.general.terminal.split_whitespace().collect();
    if template.is_empty() {
        return direct;
    }
    if template.contains(&"%c") {
        let joined = direct.iter().map(|s| shell_quote(s)).collect::<Vec<_>>().join(" ");
        template
            .iter()
            .map(|part| if *part == "%c" { joined.clone() } else { part.to_string() })
            .collect()
    } else {
        template.iter().map(|s| s.to_string()).chain(direct).collect()
    }
}

fn shell_quote(arg: &str) -> String {
    if !arg.is_empty() && arg.chars().all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c)) {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

/// Starts the entry in its own session so it outlives the launcher.
pub fn execute(entry: &Entry, config: &Config) -> Result<()> {
    if entry.command.is_empty() {
        return Ok(());
    }
    let cmd_parts = command_line(entry, config);

    let mut command = Command::new(&cmd_parts[0]);
    command.args(&cmd_parts[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    // SAFETY: runs between fork and exec, so it may only use async-signal-safe
    // calls. The closure makes a single setsid syscall and does not allocate.
    unsafe {
        command.pre_exec(|| nix::unistd::setsid().map(|_| ()).map_err(io::Error::from));
    }

    let child = command.spawn()?;
    log::info!("Launched {:?} (pid {})", cmd_parts, child.id());
    Ok(())
}
