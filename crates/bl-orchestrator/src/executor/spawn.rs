//! Platform spawn paths
//!
//! The executor's decision matrix resolves to one of four ways of starting
//! a process: direct, de-escalated (child must not inherit the host's
//! elevation), explicitly elevated, or through a shell relay. Each returns
//! the child's pid when a direct handle exists; indirect paths return
//! `None`, which disables the minimize watcher for that item.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use bl_core::LaunchItem;

/// Working directory for an item: explicit override, else the executable's
/// own directory, else the current directory.
pub(crate) fn working_dir(item: &LaunchItem, path: &Path) -> PathBuf {
    if let Some(dir) = item.working_directory.as_ref().filter(|d| !d.as_os_str().is_empty()) {
        return dir.clone();
    }
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Split an argument string the way a shell would for the simple cases:
/// whitespace-separated, with double quotes grouping.
pub(crate) fn split_args(raw: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for c in raw.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        args.push(current);
    }
    args
}

fn item_args(item: &LaunchItem) -> Vec<String> {
    item.arguments
        .as_deref()
        .map(split_args)
        .unwrap_or_default()
}

/// Whether the target is the kind of file the de-escalation path can hand
/// to a plain shell spawn.
#[cfg(windows)]
pub(crate) fn is_directly_executable(path: &Path) -> bool {
    matches!(
        path.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .as_deref(),
        Some("exe") | Some("bat") | Some("cmd")
    )
}

/// Whether the target is the kind of file the de-escalation path can hand
/// to a plain shell spawn.
#[cfg(not(windows))]
pub(crate) fn is_directly_executable(_path: &Path) -> bool {
    // No extension gate outside Windows; the kernel decides at exec time.
    true
}

/// Start the process directly and keep its pid for the minimize watcher.
pub(crate) fn direct(item: &LaunchItem, path: &Path, workdir: &Path) -> std::io::Result<Option<u32>> {
    let mut cmd = Command::new(path);
    cmd.args(item_args(item)).current_dir(workdir);
    let child = cmd.spawn()?;
    Ok(child.id())
}

/// Start the process without the host's elevated rights.
///
/// The caller only takes this path for plain executables with no arguments
/// and no minimize flags, so losing the process handle is acceptable.
#[cfg(unix)]
pub(crate) fn deescalated(path: &Path, workdir: &Path) -> std::io::Result<Option<u32>> {
    if let Ok(user) = std::env::var("SUDO_USER") {
        tracing::debug!("De-escalating via sudo -u {}", user);
        Command::new("sudo")
            .args(["-u", &user, "--"])
            .arg(path)
            .current_dir(workdir)
            .spawn()?;
        return Ok(None);
    }
    // No de-escalation target known; the child inherits our rights.
    tracing::debug!("No SUDO_USER; launching directly despite elevation");
    let child = Command::new(path).current_dir(workdir).spawn()?;
    Ok(child.id())
}

/// Start the process without the host's elevated rights, by handing the
/// path to the desktop shell instead of spawning it ourselves.
#[cfg(windows)]
pub(crate) fn deescalated(path: &Path, _workdir: &Path) -> std::io::Result<Option<u32>> {
    Command::new("explorer.exe").arg(path).spawn()?;
    Ok(None)
}

/// Start the process with an explicit elevation request.
#[cfg(unix)]
pub(crate) fn elevated(item: &LaunchItem, path: &Path, workdir: &Path) -> std::io::Result<Option<u32>> {
    // No interactive elevation prompt is available here; launch directly
    // and let the target fail if it truly needs more rights.
    tracing::warn!("No elevation prompt available; launching {} directly", path.display());
    direct(item, path, workdir)
}

/// Start the process with an explicit elevation request (may prompt).
#[cfg(windows)]
pub(crate) fn elevated(item: &LaunchItem, path: &Path, workdir: &Path) -> std::io::Result<Option<u32>> {
    let mut script = format!(
        "Start-Process -FilePath '{}' -WorkingDirectory '{}' -Verb RunAs",
        path.display().to_string().replace('\'', "''"),
        workdir.display().to_string().replace('\'', "''"),
    );
    if let Some(args) = item.arguments.as_deref().filter(|a| !a.trim().is_empty()) {
        script.push_str(&format!(" -ArgumentList '{}'", args.replace('\'', "''")));
    }
    Command::new("powershell.exe")
        .args(["-NoProfile", "-WindowStyle", "Hidden", "-Command", &script])
        .spawn()?;
    Ok(None)
}

/// Start the target indirectly through a shell relay: change into the
/// working directory first, then exec the target. Used for programs whose
/// direct launch semantics differ from a relay launch.
#[cfg(unix)]
pub(crate) fn relay(item: &LaunchItem, path: &Path, workdir: &Path) -> std::io::Result<Option<u32>> {
    let quote = |s: &str| format!("'{}'", s.replace('\'', r"'\''"));
    let mut line = format!(
        "cd {} && exec {}",
        quote(&workdir.display().to_string()),
        quote(&path.display().to_string()),
    );
    if let Some(args) = item.arguments.as_deref().filter(|a| !a.trim().is_empty()) {
        line.push(' ');
        line.push_str(args);
    }
    Command::new("sh").args(["-c", &line]).spawn()?;
    Ok(None)
}

/// Start the target indirectly through a shell relay.
#[cfg(windows)]
pub(crate) fn relay(item: &LaunchItem, path: &Path, workdir: &Path) -> std::io::Result<Option<u32>> {
    let mut line = format!(
        "cd /d \"{}\" && \"{}\"",
        workdir.display(),
        path.display(),
    );
    if let Some(args) = item.arguments.as_deref().filter(|a| !a.trim().is_empty()) {
        line.push(' ');
        line.push_str(args);
    }
    Command::new("cmd.exe").args(["/C", &line]).spawn()?;
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_args_plain() {
        assert_eq!(split_args("-a --flag value"), vec!["-a", "--flag", "value"]);
        assert!(split_args("   ").is_empty());
        assert!(split_args("").is_empty());
    }

    #[test]
    fn test_split_args_quoted() {
        assert_eq!(
            split_args(r#"--path "C:\Program Files\app" -v"#),
            vec!["--path", r"C:\Program Files\app", "-v"]
        );
    }

    #[test]
    fn test_working_dir_precedence() {
        let item = LaunchItem {
            working_directory: Some(PathBuf::from("/tmp/override")),
            ..Default::default()
        };
        assert_eq!(
            working_dir(&item, Path::new("/opt/app/bin/app")),
            PathBuf::from("/tmp/override")
        );

        let plain = LaunchItem::default();
        assert_eq!(
            working_dir(&plain, Path::new("/opt/app/bin/app")),
            PathBuf::from("/opt/app/bin")
        );
        assert_eq!(working_dir(&plain, Path::new("app")), PathBuf::from("."));
    }
}
