use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

/// Resolve the server home directory.
///
/// - `None` (or blank) → `$HOME/<default_subdir>` (`%APPDATA%` on Windows).
/// - A leading `~` is expanded against the same base.
/// - Relative paths are made absolute against the current directory.
///
/// When `create` is set the directory is created if missing.
pub fn resolve_home_dir(
    configured: Option<String>,
    default_subdir: &str,
    create: bool,
) -> Result<PathBuf> {
    let resolved = match configured.as_deref().map(str::trim) {
        None | Some("") => platform_base()?.join(default_subdir),
        Some(raw) => expand(raw)?,
    };

    let absolute = if resolved.is_absolute() {
        resolved
    } else {
        std::env::current_dir()
            .context("current directory is not accessible")?
            .join(resolved)
    };

    if create {
        std::fs::create_dir_all(&absolute)
            .with_context(|| format!("failed to create home_dir {}", absolute.display()))?;
    }
    Ok(absolute)
}

fn expand(raw: &str) -> Result<PathBuf> {
    if raw == "~" {
        return platform_base();
    }
    if let Some(rest) = raw.strip_prefix("~/").or_else(|| raw.strip_prefix("~\\")) {
        return Ok(platform_base()?.join(rest));
    }
    Ok(Path::new(raw).to_path_buf())
}

fn platform_base() -> Result<PathBuf> {
    let var = if cfg!(target_os = "windows") {
        "APPDATA"
    } else {
        "HOME"
    };
    match std::env::var_os(var) {
        Some(v) if !v.is_empty() => Ok(PathBuf::from(v)),
        _ => bail!("environment variable {var} is not set; configure server.home_dir explicitly"),
    }
}
