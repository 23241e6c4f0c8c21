//! Locates and starts the repeater helper process.

use std::{
    ffi::OsString,
    path::Path,
    process,
};

/// Name of the sibling repeater binary, resolved via PATH when no local copy
/// is present.
pub const REPEATER_BIN: &str = "hamdeck-repeater";

const REPEATER_LOCAL: &str = "./hamdeck-repeater";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Other,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else {
            Self::Other
        }
    }
}

/// Builds the spawn argument list. On macOS the interpreter path comes
/// first; elsewhere the helper is the whole command. A helper found in the
/// working directory wins over PATH resolution.
pub fn proxy_command(platform: Platform, interpreter: &Path, local_helper: bool) -> Vec<OsString> {
    let mut args = Vec::new();
    if platform == Platform::MacOs {
        args.push(interpreter.as_os_str().to_os_string());
    }
    if local_helper {
        args.push(REPEATER_LOCAL.into());
    } else {
        args.push(REPEATER_BIN.into());
    }
    args
}

/// Spawns the repeater helper, detached. The child is never waited on and
/// spawn failure is only logged; the caller cannot tell success from
/// failure.
pub fn launch_proxy() {
    let interpreter = match std::env::current_exe() {
        Ok(path) => path,
        Err(err) => {
            tracing::warn!(%err, "could not resolve own executable path");
            Path::new(REPEATER_BIN).to_path_buf()
        }
    };

    let local_helper = Path::new(REPEATER_LOCAL).exists();
    let args = proxy_command(Platform::current(), &interpreter, local_helper);
    tracing::info!(?args, "launching repeater proxy");

    let Some((bin, rest)) = args.split_first() else {
        return;
    };
    match process::Command::new(bin).args(rest).spawn() {
        Ok(child) => drop(child),
        Err(err) => tracing::warn!(%err, "repeater proxy failed to launch"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn non_mac_command_is_just_the_helper() {
        let interpreter = PathBuf::from("/usr/local/bin/hamdeck");

        let args = proxy_command(Platform::Other, &interpreter, false);
        assert_eq!(args, vec![OsString::from("hamdeck-repeater")]);

        let args = proxy_command(Platform::Other, &interpreter, true);
        assert_eq!(args, vec![OsString::from("./hamdeck-repeater")]);
    }

    #[test]
    fn mac_command_leads_with_the_interpreter() {
        let interpreter = PathBuf::from("/Applications/hamdeck");

        let args = proxy_command(Platform::MacOs, &interpreter, false);
        assert_eq!(
            args,
            vec![
                OsString::from("/Applications/hamdeck"),
                OsString::from("hamdeck-repeater"),
            ]
        );
    }

    #[test]
    fn local_helper_wins_over_path_resolution() {
        let interpreter = PathBuf::from("/Applications/hamdeck");

        let args = proxy_command(Platform::MacOs, &interpreter, true);
        assert_eq!(args[1], OsString::from("./hamdeck-repeater"));
    }
}
