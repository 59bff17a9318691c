use assert_cmd::Command;

#[test]
fn config_prints_effective_settings() {
    let output = Command::cargo_bin("bookshelf")
        .unwrap()
        .arg("config")
        .env("BOOKSHELF_CONFIG_DIR", env!("CARGO_MANIFEST_DIR"))
        .env("BOOKSHELF_PAGINATION__DEFAULT_LIMIT", "7")
        .env_remove("BOOKSHELF_ENV")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let settings: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(settings["cache"]["authors_tag"], "authorsCache");
    assert_eq!(settings["pagination"]["default_limit"], 7);
    assert_eq!(settings["environment"], "local");
}

#[test]
fn unknown_environment_fails() {
    Command::cargo_bin("bookshelf")
        .unwrap()
        .arg("config")
        .env("BOOKSHELF_ENV", "moon")
        .assert()
        .failure();
}

#[test]
fn serve_rejects_a_non_numeric_port() {
    Command::cargo_bin("bookshelf")
        .unwrap()
        .args(["serve", "--port", "http"])
        .assert()
        .failure();
}
