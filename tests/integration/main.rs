//! Integration tests for shaderkit

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::io::Write;
    use std::path::Path;
    use tempfile::TempDir;

    /// Isolated from the user's config and forced into plain output
    fn shaderkit(home: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("shaderkit");
        cmd.env("SHADERKIT_CONFIG", home.path().join("config.toml"))
            .env("CI", "1");
        cmd
    }

    fn write_cache(data_root: &Path, title: &str, entries: usize) {
        let dir = data_root
            .join("games")
            .join(title.to_lowercase())
            .join("cache")
            .join("shader")
            .join("guest")
            .join("program");
        std::fs::create_dir_all(&dir).unwrap();
        let file = std::fs::File::create(dir.join("cache.zip")).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        for i in 0..entries {
            zip.start_file(format!("{i:08x}"), zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"shader").unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        shaderkit(&home)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("emulator shader cache manager"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        shaderkit(&home)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("shaderkit"));
    }

    #[test]
    fn count_without_cache_is_zero() {
        let home = TempDir::new().unwrap();
        shaderkit(&home)
            .args(["count", "0100ABCD"])
            .arg("--data-root")
            .arg(home.path())
            .assert()
            .success()
            .stdout("0\n");
    }

    #[test]
    fn count_reads_archive_entries() {
        let home = TempDir::new().unwrap();
        write_cache(home.path(), "0100ABCD", 3);
        shaderkit(&home)
            .args(["count", "0100abcd"])
            .arg("--data-root")
            .arg(home.path())
            .assert()
            .success()
            .stdout("3\n");
    }

    #[test]
    fn count_uses_configured_data_root() {
        let home = TempDir::new().unwrap();
        let data_root = home.path().join("emu");
        write_cache(&data_root, "0100ABCD", 5);
        std::fs::write(
            home.path().join("config.toml"),
            format!("[paths]\ndata_root = {:?}\n", data_root.display().to_string()),
        )
        .unwrap();

        shaderkit(&home)
            .args(["count", "0100ABCD"])
            .assert()
            .success()
            .stdout("5\n");
    }

    #[test]
    fn blank_title_is_rejected() {
        let home = TempDir::new().unwrap();
        shaderkit(&home)
            .args(["count", "  "])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid title id"));
    }

    #[test]
    fn config_path() {
        let home = TempDir::new().unwrap();
        shaderkit(&home)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let home = TempDir::new().unwrap();
        shaderkit(&home)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[remote]"))
            .stdout(predicate::str::contains("insecure_upload = false"));
    }

    #[test]
    fn config_init_writes_file() {
        let home = TempDir::new().unwrap();
        shaderkit(&home)
            .args(["config", "init"])
            .assert()
            .success();
        let written = std::fs::read_to_string(home.path().join("config.toml")).unwrap();
        assert!(written.contains("binary_name = \"ryujinx\""));
    }

    #[test]
    fn invalid_config_fails() {
        let home = TempDir::new().unwrap();
        std::fs::write(home.path().join("config.toml"), "[paths\n").unwrap();
        shaderkit(&home)
            .args(["count", "0100ABCD"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn share_without_emulator_is_cancelled() {
        let home = TempDir::new().unwrap();
        shaderkit(&home)
            .args(["share", "0100ABCD", "--remote-count", "0"])
            .arg("--data-root")
            .arg(home.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Operation cancelled"));
    }

    #[test]
    fn share_rejects_other_emulators() {
        let home = TempDir::new().unwrap();
        shaderkit(&home)
            .args(["share", "0100ABCD", "--remote-count", "0"])
            .args(["--emulator", "/usr/bin/yuzu"])
            .arg("--data-root")
            .arg(home.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("INVALID_RYUJINX_BINARY"));
    }
}
