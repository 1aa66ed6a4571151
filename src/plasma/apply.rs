use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::{debug, info};

use crate::color::{hex, kde_triplet};
use crate::config::Tools;
use crate::derive::ThemePalette;
use crate::error::{Error, Result};

/// Placeholder in the Aurorae decoration template.
pub const DECORATION_PLACEHOLDER: &str = "TEMPLAT";

/// Pause between switching the Plasma theme away and back.
pub const RELOAD_DELAY: Duration = Duration::from_millis(500);

/// Runs an external program and returns its stdout.
pub trait CommandRunner {
    fn run(&mut self, program: &str, args: &[String]) -> Result<String>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &mut R {
    fn run(&mut self, program: &str, args: &[String]) -> Result<String> {
        (**self).run(program, args)
    }
}

/// Runs programs with `std::process::Command`.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, program: &str, args: &[String]) -> Result<String> {
        debug!(program, ?args, "running");
        let output = Command::new(program)
            .args(args)
            .stderr(Stdio::null())
            .output()
            .map_err(|source| Error::Spawn {
                program: program.to_string(),
                source,
            })?;
        if !output.status.success() {
            return Err(Error::CommandFailed {
                program: program.to_string(),
                status: output.status.to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Applies a palette to a running Plasma session.
pub struct Kde<'a, R> {
    runner: R,
    tools: &'a Tools,
    theme_name: &'a str,
    reload_delay: Duration,
}

impl<'a, R: CommandRunner> Kde<'a, R> {
    pub fn new(runner: R, tools: &'a Tools, theme_name: &'a str) -> Self {
        Self {
            runner,
            tools,
            theme_name,
            reload_delay: RELOAD_DELAY,
        }
    }

    pub fn with_reload_delay(mut self, delay: Duration) -> Self {
        self.reload_delay = delay;
        self
    }

    fn kwriteconfig(&mut self, file: &str, group: &str, key: &str, value: &str) -> Result<()> {
        let args = vec![
            format!("--file={file}"),
            format!("--group={group}"),
            format!("--key={key}"),
            value.to_string(),
        ];
        self.runner.run(&self.tools.kwriteconfig, &args)?;
        Ok(())
    }

    /// Switch the Plasma theme away and back so Plasma rereads its colours.
    pub fn reload_plasma_theme(&mut self) -> Result<()> {
        self.kwriteconfig("plasmarc", "Theme", "name", "Default")?;
        // Plasma misses the change when it is reverted too quickly.
        std::thread::sleep(self.reload_delay);
        let name = self.theme_name;
        self.kwriteconfig("plasmarc", "Theme", "name", name)
    }

    /// Selection and window decoration colours live in `kdeglobals`.
    pub fn write_kdeglobals(&mut self, palette: &ThemePalette) -> Result<()> {
        let decoration = kde_triplet(palette.window_decoration);
        let focus = kde_triplet(palette.focus_decoration);
        self.kwriteconfig("kdeglobals", "Colors:Selection", "BackgroundNormal", &decoration)?;
        self.kwriteconfig("kdeglobals", "Colors:View", "DecorationFocus", &focus)?;
        self.kwriteconfig("kdeglobals", "WM", "activeBackground", &decoration)
    }

    /// Whether KWin currently uses this theme's Aurorae decoration.
    pub fn decoration_active(&mut self) -> Result<bool> {
        let args = vec![
            "--file=kwinrc".to_string(),
            "--group=org.kde.kdecoration2".to_string(),
            "--key=theme".to_string(),
        ];
        let current = self.runner.run(&self.tools.kreadconfig, &args)?;
        Ok(current.contains(self.theme_name))
    }

    /// Recolour the Aurorae decoration and have KWin reload it.
    pub fn update_decoration(&mut self, aurorae_theme_dir: &Path, palette: &ThemePalette) -> Result<PathBuf> {
        let dir = aurorae_theme_dir.join(self.theme_name);
        let template_path = dir.join("decoration-template.svg");
        let template = std::fs::read_to_string(&template_path)
            .map_err(|_| Error::TemplateMissing(template_path.clone()))?;

        // Nothing is written until KWin is known to be there to reload it.
        self.require_kwin()?;

        let svg = template.replace(DECORATION_PLACEHOLDER, &hex(palette.window_decoration));
        let path = dir.join("decoration.svg");
        std::fs::write(&path, svg).map_err(|e| Error::io(&path, e))?;
        info!(path = %path.display(), "wrote aurorae decoration");

        self.runner.run(&self.tools.kbuildsycoca, &[])?;
        let theme = format!("__aurorae__svg__{}", self.theme_name);
        self.kwriteconfig("kwinrc", "org.kde.kdecoration2", "theme", &theme)?;
        self.reconfigure_kwin()?;
        Ok(path)
    }

    /// Ask the session bus whether `org.kde.KWin` has an owner.
    fn require_kwin(&mut self) -> Result<()> {
        let args = [
            "--session",
            "--print-reply",
            "--dest=org.freedesktop.DBus",
            "/org/freedesktop/DBus",
            "org.freedesktop.DBus.NameHasOwner",
            "string:org.kde.KWin",
        ]
        .map(String::from);
        let reply = self
            .runner
            .run(&self.tools.dbus_send, &args)
            .map_err(|_| Error::KwinUnavailable)?;
        if reply.contains("boolean true") {
            Ok(())
        } else {
            Err(Error::KwinUnavailable)
        }
    }

    fn reconfigure_kwin(&mut self) -> Result<()> {
        let args = [
            "--session",
            "--dest=org.kde.KWin",
            "--type=method_call",
            "/KWin",
            "org.kde.KWin.reconfigure",
        ]
        .map(String::from);
        self.runner
            .run(&self.tools.dbus_send, &args)
            .map(|_| ())
            .map_err(|_| Error::KwinUnavailable)
    }

    /// Push `palette` into the session after the colour file has been written.
    pub fn apply(&mut self, palette: &ThemePalette, aurorae_theme_dir: &Path) -> Result<()> {
        self.reload_plasma_theme()?;
        self.write_kdeglobals(palette)?;
        if self.decoration_active()? {
            self.update_decoration(aurorae_theme_dir, palette)?;
        } else {
            debug!("aurorae decoration not in use, leaving it alone");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::derive;
    use crate::select::BaseColor;
    use palette::Srgb;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(String, Vec<String>)>,
        kwin_theme: String,
        kwin_missing: bool,
        bus_down: bool,
    }

    impl CommandRunner for Recorder {
        fn run(&mut self, program: &str, args: &[String]) -> Result<String> {
            self.calls.push((program.to_string(), args.to_vec()));
            if program == "dbus-send" {
                if self.bus_down {
                    return Err(Error::CommandFailed {
                        program: program.to_string(),
                        status: "exit status: 1".into(),
                    });
                }
                if args.iter().any(|a| a.ends_with("NameHasOwner")) {
                    let owned = if self.kwin_missing { "false" } else { "true" };
                    return Ok(format!("method return sender=org.freedesktop.DBus\n   boolean {owned}\n"));
                }
            }
            if program == "kreadconfig5" {
                return Ok(self.kwin_theme.clone());
            }
            Ok(String::new())
        }
    }

    fn palette() -> ThemePalette {
        derive(&BaseColor::new(Srgb::new(255, 0, 0)))
    }

    fn programs(recorder: &Recorder) -> Vec<&str> {
        recorder.calls.iter().map(|(p, _)| p.as_str()).collect()
    }

    #[test]
    fn kdeglobals_get_decoration_colours() {
        let tools = Tools::default();
        let mut recorder = Recorder::default();
        Kde::new(&mut recorder, &tools, "Culla")
            .write_kdeglobals(&palette())
            .unwrap();

        assert_eq!(recorder.calls.len(), 3);
        assert_eq!(
            recorder.calls[0].1,
            vec![
                "--file=kdeglobals",
                "--group=Colors:Selection",
                "--key=BackgroundNormal",
                "166,63,63"
            ]
        );
        assert_eq!(recorder.calls[1].1[3], "178,81,81");
        assert_eq!(recorder.calls[2].1[1], "--group=WM");
    }

    #[test]
    fn theme_is_toggled() {
        let tools = Tools::default();
        let mut recorder = Recorder::default();
        Kde::new(&mut recorder, &tools, "Culla")
            .with_reload_delay(Duration::ZERO)
            .reload_plasma_theme()
            .unwrap();
        assert_eq!(recorder.calls[0].1[3], "Default");
        assert_eq!(recorder.calls[1].1[3], "Culla");
    }

    #[test]
    fn inactive_decoration_is_skipped() {
        let tools = Tools::default();
        let tmp = tempfile::tempdir().unwrap();
        let mut recorder = Recorder {
            kwin_theme: "org.kde.breeze\n".into(),
            ..Recorder::default()
        };
        Kde::new(&mut recorder, &tools, "Culla")
            .with_reload_delay(Duration::ZERO)
            .apply(&palette(), tmp.path())
            .unwrap();
        assert_eq!(
            programs(&recorder),
            vec!["kwriteconfig5"; 5]
                .into_iter()
                .chain(["kreadconfig5"])
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn active_decoration_is_recoloured() {
        let tools = Tools::default();
        let tmp = tempfile::tempdir().unwrap();
        let theme_dir = tmp.path().join("Culla");
        std::fs::create_dir(&theme_dir).unwrap();
        std::fs::write(
            theme_dir.join("decoration-template.svg"),
            "<rect fill=\"TEMPLAT\"/>",
        )
        .unwrap();

        let mut recorder = Recorder {
            kwin_theme: "__aurorae__svg__Culla\n".into(),
            ..Recorder::default()
        };
        Kde::new(&mut recorder, &tools, "Culla")
            .with_reload_delay(Duration::ZERO)
            .apply(&palette(), tmp.path())
            .unwrap();

        let svg = std::fs::read_to_string(theme_dir.join("decoration.svg")).unwrap();
        assert_eq!(svg, "<rect fill=\"#a63f3f\"/>");
        let progs = programs(&recorder);
        assert_eq!(
            &progs[progs.len() - 4..],
            ["dbus-send", "kbuildsycoca5", "kwriteconfig5", "dbus-send"]
        );
        let (_, check) = &recorder.calls[recorder.calls.len() - 4];
        assert_eq!(check.last().unwrap(), "string:org.kde.KWin");
        let (_, args) = &recorder.calls[recorder.calls.len() - 2];
        assert_eq!(args[3], "__aurorae__svg__Culla");
    }

    #[test]
    fn missing_template_is_reported() {
        let tools = Tools::default();
        let tmp = tempfile::tempdir().unwrap();
        let mut recorder = Recorder::default();
        let err = Kde::new(&mut recorder, &tools, "Culla")
            .update_decoration(tmp.path(), &palette())
            .unwrap_err();
        assert!(matches!(err, Error::TemplateMissing(_)));
        assert!(recorder.calls.is_empty());
    }

    #[test]
    fn kwin_not_running() {
        let tools = Tools::default();
        let tmp = tempfile::tempdir().unwrap();
        let theme_dir = tmp.path().join("Culla");
        std::fs::create_dir(&theme_dir).unwrap();
        std::fs::write(theme_dir.join("decoration-template.svg"), "TEMPLAT").unwrap();

        let mut recorder = Recorder {
            kwin_missing: true,
            ..Recorder::default()
        };
        let err = Kde::new(&mut recorder, &tools, "Culla")
            .update_decoration(tmp.path(), &palette())
            .unwrap_err();
        assert!(matches!(err, Error::KwinUnavailable));
        assert_eq!(programs(&recorder), ["dbus-send"]);
        assert!(!theme_dir.join("decoration.svg").exists());
    }

    #[test]
    fn unreachable_session_bus_leaves_kwin_config_alone() {
        let tools = Tools::default();
        let tmp = tempfile::tempdir().unwrap();
        let theme_dir = tmp.path().join("Culla");
        std::fs::create_dir(&theme_dir).unwrap();
        std::fs::write(theme_dir.join("decoration-template.svg"), "TEMPLAT").unwrap();

        let mut recorder = Recorder {
            kwin_theme: "__aurorae__svg__Culla\n".into(),
            bus_down: true,
            ..Recorder::default()
        };
        let err = Kde::new(&mut recorder, &tools, "Culla")
            .with_reload_delay(Duration::ZERO)
            .apply(&palette(), tmp.path())
            .unwrap_err();
        assert!(matches!(err, Error::KwinUnavailable));
        let progs = programs(&recorder);
        assert!(!progs.contains(&"kbuildsycoca5"));
        assert_eq!(progs.last(), Some(&"dbus-send"));
        assert!(!theme_dir.join("decoration.svg").exists());
    }
}
