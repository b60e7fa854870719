use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn fixture_path(name: &str) -> PathBuf {
    let base = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    base.join("target").join("tmp-tests").join(name)
}

fn write_file(path: &PathBuf, text: &str) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    fs::write(path, text).expect("write file");
}

fn easyergo(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_easyergo"))
        .env_remove("EASYERGO_CONFIG")
        .env_remove("EASYBUILD_ROBOT_PATHS")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("run easyergo")
}

#[test]
fn check_passes_clean_easyconfig() {
    let root = fixture_path("cli_clean");
    let file = root.join("zlib-1.2.13.eb");
    write_file(
        &file,
        "name = 'zlib'\nversion = '1.2.13'\nhomepage = 'https://www.zlib.net/'\ntoolchain = SYSTEM\n",
    );

    let output = easyergo(&[
        "--robot-path",
        root.to_str().expect("root path"),
        "check",
        file.to_str().expect("file path"),
    ]);

    assert!(output.status.success(), "{output:#?}");
    assert!(output.stdout.is_empty(), "{output:#?}");
}

#[test]
fn check_reports_diagnostics_and_fails() {
    let root = fixture_path("cli_unknown_variable");
    let file = root.join("zlib-1.2.13.eb");
    write_file(&file, "name = 'zlib'\nversion = '1.2.13'\nhomepge = 'x'\n");

    let output = easyergo(&[
        "--robot-path",
        root.to_str().expect("root path"),
        "check",
        file.to_str().expect("file path"),
    ]);

    assert_eq!(output.status.code(), Some(1), "{output:#?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("information W_UNKNOWN_VARIABLE"),
        "{stdout}"
    );
    assert!(stdout.contains(":3:1]: Did you mean: "), "{stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("check failed with diagnostics"), "{stderr}");
}

#[test]
fn check_emits_json_with_paths() {
    let root = fixture_path("cli_json");
    let file = root.join("zlib-1.2.13.eb");
    write_file(&file, "name = 'zlib'\nversion = '1.2.12'\n");

    let output = easyergo(&[
        "--robot-path",
        root.to_str().expect("root path"),
        "check",
        "--format",
        "json",
        file.to_str().expect("file path"),
    ]);

    assert_eq!(output.status.code(), Some(1), "{output:#?}");
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("json diagnostics");
    let diagnostics = payload.as_array().expect("diagnostic array");
    assert_eq!(diagnostics.len(), 1, "{payload:#?}");
    assert_eq!(diagnostics[0]["code"], "W_FILENAME_MISMATCH");
    assert_eq!(diagnostics[0]["message"], "Does not match filename");
    assert_eq!(diagnostics[0]["severity"], "information");
    assert_eq!(diagnostics[0]["source"], "EasyErgo");
    assert_eq!(diagnostics[0]["range"]["start"]["line"], 1);
    assert_eq!(
        diagnostics[0]["path"],
        serde_json::json!(file.display().to_string())
    );
}

#[test]
fn check_uses_robot_paths_from_settings() {
    let root = fixture_path("cli_settings");
    write_file(
        &root.join("robot").join("z").join("zlib").join("zlib-1.2.11.eb"),
        "",
    );
    let settings = root.join("easyergo.toml");
    write_file(&settings, "robot_paths = [\"robot\"]\n");
    let file = root.join("work").join("mypkg-1.0.eb");
    write_file(
        &file,
        "name = 'mypkg'\nversion = '1.0'\ntoolchain = SYSTEM\ndependencies = [('zlib', '1.2.13')]\n",
    );

    let output = easyergo(&[
        "--config",
        settings.to_str().expect("settings path"),
        "check",
        file.to_str().expect("file path"),
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Try zlib-1.2.11.eb"), "{output:#?}");
}

#[test]
fn missing_file_is_an_error() {
    let root = fixture_path("cli_missing");
    let _ = fs::create_dir_all(&root);
    let missing = root.join("absent-1.0.eb");

    let output = easyergo(&[
        "--robot-path",
        root.to_str().expect("root path"),
        "check",
        missing.to_str().expect("missing path"),
    ]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read"), "{stderr}");
}

#[test]
fn unknown_setting_is_rejected() {
    let root = fixture_path("cli_bad_settings");
    let settings = root.join("easyergo.toml");
    write_file(&settings, "robot_path = [\"typo\"]\n");
    let file = root.join("zlib-1.2.13.eb");
    write_file(&file, "name = 'zlib'\n");

    let output = easyergo(&[
        "--config",
        settings.to_str().expect("settings path"),
        "check",
        file.to_str().expect("file path"),
    ]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown setting `robot_path`"), "{stderr}");
}
