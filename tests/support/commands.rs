//! Command helper methods for Test.

use super::Test;
use assert_cmd::Command;
use std::path::Path;
use std::process::Output;

impl Test {
    /// Create a moss command with an isolated environment.
    ///
    /// Returns a Command configured with:
    /// - MOSS_HOME set to the temporary instance root
    /// - HOME set to the scratch directory
    /// - moss overrides from the outer environment removed
    pub fn cmd(&self) -> Command {
        #[allow(deprecated)]
        let mut cmd = Command::cargo_bin("moss").expect("failed to find moss binary");
        cmd.env("MOSS_HOME", self.home.path());
        cmd.env("HOME", self.dir.path());
        for var in [
            "MOSS_STORE",
            "MOSS_IDENTITY_FILE",
            "MOSS_PASSPHRASE",
            "MOSS_LOG",
            "XDG_DATA_HOME",
            "VISUAL",
        ] {
            cmd.env_remove(var);
        }
        cmd.env("EDITOR", "false");
        cmd.current_dir(self.dir.path());
        cmd
    }

    /// Shortcut for `moss init`.
    pub fn init_cmd(&self, keyfile: &Path) -> Output {
        self.cmd()
            .arg("init")
            .arg(keyfile)
            .output()
            .expect("failed to run moss init")
    }

    /// Shortcut for `moss generate`.
    pub fn generate(&self, name: &str, length: &str) -> Output {
        self.cmd()
            .args(["generate", name, length])
            .output()
            .expect("failed to run moss generate")
    }

    /// Shortcut for `moss add` with `value` on stdin.
    pub fn add(&self, name: &str, value: &str) -> Output {
        self.cmd()
            .args(["add", name])
            .write_stdin(value)
            .output()
            .expect("failed to run moss add")
    }

    /// Shortcut for `moss add --force`.
    pub fn add_force(&self, name: &str, value: &str) -> Output {
        self.cmd()
            .args(["add", name, "--force"])
            .write_stdin(value)
            .output()
            .expect("failed to run moss add --force")
    }

    /// Shortcut for `moss show`.
    pub fn show(&self, name: &str) -> Output {
        self.cmd()
            .args(["show", name])
            .output()
            .expect("failed to run moss show")
    }

    /// Shortcut for `moss rm`.
    pub fn rm(&self, name: &str) -> Output {
        self.cmd()
            .args(["rm", name])
            .output()
            .expect("failed to run moss rm")
    }

    /// Shortcut for `moss search`.
    pub fn search(&self, terms: &[&str]) -> Output {
        self.cmd()
            .arg("search")
            .args(terms)
            .output()
            .expect("failed to run moss search")
    }

    /// Shortcut for `moss list`.
    pub fn list(&self) -> Output {
        self.cmd()
            .arg("list")
            .output()
            .expect("failed to run moss list")
    }

    /// Shortcut for `moss config`.
    pub fn config(&self) -> Output {
        self.cmd()
            .arg("config")
            .output()
            .expect("failed to run moss config")
    }

    /// Shortcut for `moss edit` with `editor` as EDITOR.
    pub fn edit(&self, name: &str, editor: &Path) -> Output {
        self.cmd()
            .env("EDITOR", editor)
            .args(["edit", name])
            .output()
            .expect("failed to run moss edit")
    }

    /// Shortcut for `moss share`.
    pub fn share(&self, key: &str, dir: Option<&str>) -> Output {
        let mut cmd = self.cmd();
        cmd.args(["share", key]);
        if let Some(dir) = dir {
            cmd.arg(format!("--dir={}", dir));
        }
        cmd.output().expect("failed to run moss share")
    }

    /// Shortcut for `moss git`.
    pub fn git(&self, args: &[&str]) -> Output {
        self.cmd()
            .arg("git")
            .args(args)
            .output()
            .expect("failed to run moss git")
    }
}
