use crate::error::{ErrorKind, Result};
use crate::opener::Opener;
use exn::OptionExt;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

/// A program plus leading arguments; the path to open is appended last.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Launcher {
    pub program: PathBuf,
    pub args: Vec<OsString>,
}
impl Launcher {
    pub fn new<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self { program: program.into(), args: args.into_iter().map(Into::into).collect() }
    }
}

/// Opens paths with the host's default application.
///
/// Detection happens once, at construction. A system without any launcher
/// still yields a usable `SystemOpener`; every [`open`](Opener::open) then
/// fails with [`OpenerNotFound`](ErrorKind::OpenerNotFound).
#[derive(Clone, Debug)]
pub struct SystemOpener {
    launcher: Option<Launcher>,
}
impl SystemOpener {
    pub fn detect() -> Self {
        let launcher = Self::platform_launcher();
        match &launcher {
            Some(launcher) => tracing::debug!(program = %launcher.program.display(), "Detected default-application launcher"),
            None => tracing::info!("No default-application launcher found; open requests will fail"),
        }
        Self { launcher }
    }

    /// Use an explicit launcher instead of detecting one.
    pub fn with_command<I, S>(program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self { launcher: Some(Launcher::new(program, args)) }
    }

    pub fn launcher(&self) -> Option<&Launcher> {
        self.launcher.as_ref()
    }

    // ShellExecute's file association lookup, without cmd.exe parsing the
    // path (`&` and `^` are legal in file names).
    #[cfg(windows)]
    fn platform_launcher() -> Option<Launcher> {
        Some(Launcher::new("rundll32", ["url.dll,FileProtocolHandler"]))
    }

    #[cfg(target_os = "macos")]
    fn platform_launcher() -> Option<Launcher> {
        which::which("open").ok().map(|path| Launcher::new(path, Vec::<OsString>::new()))
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    fn platform_launcher() -> Option<Launcher> {
        if let Ok(path) = which::which("xdg-open") {
            return Some(Launcher::new(path, Vec::<OsString>::new()));
        }
        tracing::trace!("xdg-open not found in PATH; trying gio");
        which::which("gio").ok().map(|path| Launcher::new(path, ["open"]))
    }

    #[cfg(not(any(windows, unix)))]
    fn platform_launcher() -> Option<Launcher> {
        None
    }
}
impl Default for SystemOpener {
    fn default() -> Self {
        Self::detect()
    }
}

impl Opener for SystemOpener {
    fn open(&self, path: &Path) -> Result<()> {
        let launcher = self.launcher.as_ref().ok_or_raise(|| ErrorKind::OpenerNotFound)?;
        tracing::debug!(program = %launcher.program.display(), path = %path.display(), "Launching default application");
        let status = Command::new(&launcher.program)
            .args(&launcher.args)
            .arg(path)
            .status()
            .map_err(|e| ErrorKind::from_io(e, &launcher.program))?;
        if !status.success() {
            exn::bail!(ErrorKind::OpenFailed(status.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_never_panics() {
        let _ = SystemOpener::detect();
    }

    #[cfg(windows)]
    #[test]
    fn windows_launcher_bypasses_the_shell() {
        let launcher = SystemOpener::platform_launcher().unwrap();
        assert_eq!(launcher, Launcher::new("rundll32", ["url.dll,FileProtocolHandler"]));
        assert_ne!(launcher.program, PathBuf::from("cmd"));
    }

    #[test]
    fn explicit_command_is_kept() {
        let opener = SystemOpener::with_command("my-viewer", ["--new-window"]);
        assert_eq!(opener.launcher(), Some(&Launcher::new("my-viewer", ["--new-window"])));
    }

    #[test]
    fn missing_launcher_reports_not_found() {
        let opener = SystemOpener { launcher: None };
        let err = opener.open(Path::new("anything")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::OpenerNotFound));
    }

    #[cfg(unix)]
    #[test]
    fn successful_launcher() {
        let opener = SystemOpener::with_command("true", Vec::<OsString>::new());
        assert!(opener.open(Path::new("/tmp")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn failing_launcher_reports_status() {
        let opener = SystemOpener::with_command("false", Vec::<OsString>::new());
        let err = opener.open(Path::new("/tmp")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::OpenFailed(_)));
    }

    #[test]
    fn nonexistent_program() {
        let opener = SystemOpener::with_command("/definitely/not/a/launcher", Vec::<OsString>::new());
        let err = opener.open(Path::new("file.txt")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }
}
