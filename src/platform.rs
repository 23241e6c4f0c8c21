//! Opaque platform services the shell delegates to: sound playback and
//! opening files with the desktop's default handler.

use std::{fmt::Debug, io, path::Path, process};

pub trait PlatformServices: Debug {
    /// Best-effort sound playback. Failure is logged, never surfaced.
    fn play_sound(&self, resource: &str);

    fn open_text_file(&self, path: &Path) -> io::Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct NativePlatform;

impl NativePlatform {
    fn player() -> &'static str {
        if cfg!(target_os = "macos") {
            "afplay"
        } else {
            "aplay"
        }
    }

    fn opener() -> &'static str {
        if cfg!(target_os = "macos") {
            "open"
        } else {
            "xdg-open"
        }
    }
}

impl PlatformServices for NativePlatform {
    fn play_sound(&self, resource: &str) {
        if let Err(err) = process::Command::new(Self::player()).arg(resource).spawn() {
            tracing::warn!(%err, resource, "sound playback failed");
        }
    }

    fn open_text_file(&self, path: &Path) -> io::Result<()> {
        process::Command::new(Self::opener()).arg(path).spawn()?;
        Ok(())
    }
}
