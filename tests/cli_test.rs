//! CLI contract tests
//!
//! Runs the built binary against temporary repositories: ratcheting on a
//! developer machine, refusing to ratchet on CI, failing over budget, and
//! the SpotBugs branch gate.

use git2::{Repository, Signature};
use std::fs;
use std::path::Path;
use std::process::Command;

fn qualigate_bin() -> String {
    env!("CARGO_BIN_EXE_qualigate").to_string()
}

fn run(dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(qualigate_bin())
        .arg("-C")
        .arg(dir)
        .args(args)
        .env_remove("CI")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run qualigate");
    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
    )
}

/// Git repository with one commit on `branch`.
fn setup_repo(branch: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    fs::write(dir.path().join("README.md"), "demo").unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new("README.md")).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = Signature::now("Test User", "test@example.com").unwrap();
    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
        .unwrap();
    let commit = repo.find_commit(oid).unwrap();
    repo.branch(branch, &commit, true).unwrap();
    repo.set_head(&format!("refs/heads/{branch}")).unwrap();

    dir
}

fn write_checkstyle_report(root: &Path, errors: usize) {
    let dir = root.join("target/reports/checkstyle");
    fs::create_dir_all(&dir).unwrap();
    let body = "<error line=\"1\" severity=\"warning\" message=\"m\"/>".repeat(errors);
    fs::write(
        dir.join("main.xml"),
        format!("<checkstyle version=\"8.19\"><file name=\"A.java\">{body}</file></checkstyle>"),
    )
    .unwrap();
}

fn write_spotbugs_report(root: &Path, bugs: usize) {
    let dir = root.join("target/spotbugsReports");
    fs::create_dir_all(&dir).unwrap();
    let body = "<BugInstance type=\"NP\" priority=\"2\"/>".repeat(bugs);
    fs::write(
        dir.join("main.xml"),
        format!("<BugCollection version=\"3.1.12\">{body}</BugCollection>"),
    )
    .unwrap();
}

fn limits(root: &Path) -> String {
    fs::read_to_string(root.join("static-analysis.properties")).unwrap()
}

#[test]
fn test_local_run_ratchets_limit_down() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("static-analysis.properties"), "checkstyle=100\n").unwrap();
    write_checkstyle_report(dir.path(), 50);

    let (code, _, _) = run(dir.path(), &["check"]);
    assert_eq!(code, 0);
    assert!(limits(dir.path()).contains("checkstyle=50"));
}

#[test]
fn test_ci_run_refuses_to_ratchet() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("static-analysis.properties"), "checkstyle=100\n").unwrap();
    write_checkstyle_report(dir.path(), 50);

    let (code, stdout, _) = run(dir.path(), &["check", "--ci"]);
    assert_eq!(code, 1);
    assert!(
        stdout.contains("Checkstyle limit is too high, must be 50"),
        "{stdout}"
    );
    assert_eq!(limits(dir.path()), "checkstyle=100\n");
}

#[test]
fn test_ci_env_variable_counts_as_ci() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("static-analysis.properties"), "checkstyle=100\n").unwrap();
    write_checkstyle_report(dir.path(), 50);

    let output = Command::new(qualigate_bin())
        .arg("-C")
        .arg(dir.path())
        .arg("check")
        .env("CI", "true")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert_eq!(limits(dir.path()), "checkstyle=100\n");
}

#[test]
fn test_over_budget_fails_on_feature_branch() {
    let dir = setup_repo("feature/BACKEND-1");
    fs::write(dir.path().join("static-analysis.properties"), "findbugs=20\n").unwrap();
    write_spotbugs_report(dir.path(), 25);

    let (code, stdout, _) = run(dir.path(), &["check"]);
    assert_eq!(code, 1);
    assert!(
        stdout.contains("Too much SpotBugs errors: actual=25, limit=20"),
        "{stdout}"
    );
}

#[test]
fn test_spotbugs_skipped_on_release_branch() {
    let dir = setup_repo("release/1.0");
    fs::write(dir.path().join("static-analysis.properties"), "findbugs=20\n").unwrap();
    write_spotbugs_report(dir.path(), 25);

    let (code, stdout, _) = run(dir.path(), &["check", "--ci"]);
    assert_eq!(code, 0, "{stdout}");
    assert!(stdout.contains("SpotBugs skipped"), "{stdout}");
}

#[test]
fn test_missing_limits_file_passes() {
    let dir = tempfile::tempdir().unwrap();
    write_checkstyle_report(dir.path(), 500);

    let (code, _, _) = run(dir.path(), &["check", "--ci"]);
    assert_eq!(code, 0);
    assert!(!dir.path().join("static-analysis.properties").exists());
}

#[test]
fn test_missing_report_passes() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("static-analysis.properties"), "checkstyle=0\n").unwrap();

    let (code, stdout, _) = run(dir.path(), &["check", "--tool", "checkstyle", "--ci"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("produced no report"), "{stdout}");
}

#[test]
fn test_unknown_tool_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run(dir.path(), &["check", "--tool", "pmd"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Unknown or disabled tool 'pmd'"), "{stderr}");
}

#[test]
fn test_corrupt_limits_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("static-analysis.properties"), "checkstyle=many\n").unwrap();
    write_checkstyle_report(dir.path(), 1);

    let (code, _, stderr) = run(dir.path(), &["check"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Corrupt limits file"), "{stderr}");
}

#[test]
fn test_branch_identifier() {
    let dir = setup_repo("feature/BACKEND-2588_build-jar");
    let (code, stdout, _) = run(dir.path(), &["branch", "--identifier"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "feature-BACKEND-2588-build-jar");
}

#[test]
fn test_branch_require_development() {
    let dev = setup_repo("dev");
    let (code, _, _) = run(dev.path(), &["branch", "--require-development"]);
    assert_eq!(code, 1);

    let feature = setup_repo("feature/x");
    let (code, stdout, _) = run(feature.path(), &["branch", "--require-development"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("development"), "{stdout}");
}

#[test]
fn test_limits_set_and_show() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run(dir.path(), &["limits", "set", "findbugs", "20"]);
    assert_eq!(code, 0);
    let (code, _, _) = run(dir.path(), &["limits", "set", "checkstyle", "7"]);
    assert_eq!(code, 0);

    let content = limits(dir.path());
    assert!(content.contains("checkstyle=7"));
    assert!(content.contains("findbugs=20"));

    let (code, stdout, _) = run(dir.path(), &["limits", "show"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("findbugs"), "{stdout}");
}

#[test]
fn test_render_detekt_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("static-analysis.properties"), "detekt=9\n").unwrap();
    fs::write(
        dir.path().join("detekt-template.yml"),
        "build:\n  maxIssues: %MAX_ISSUES%\n",
    )
    .unwrap();

    let template = dir.path().join("detekt-template.yml");
    let (code, _, _) = run(
        dir.path(),
        &["render-detekt", "--template", template.to_str().unwrap()],
    );
    assert_eq!(code, 0);
    assert_eq!(
        fs::read_to_string(dir.path().join("target/detekt.yml")).unwrap(),
        "build:\n  maxIssues: 10\n"
    );
}

#[test]
fn test_init_writes_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(".gitignore"), "target/\n").unwrap();

    let (code, _, _) = run(dir.path(), &["init"]);
    assert_eq!(code, 0);
    assert!(dir.path().join("qualigate.toml").exists());
    assert!(fs::read_to_string(dir.path().join(".gitignore"))
        .unwrap()
        .contains("static-analysis.properties.lock"));

    // the example config must load
    let (code, _, stderr) = run(dir.path(), &["limits", "show"]);
    assert_eq!(code, 0, "{stderr}");
}

#[test]
fn test_init_ignores_sidecars_of_configured_limits_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("qualigate.toml"),
        "limits_file = \"quality/limits.txt\"\n",
    )
    .unwrap();
    fs::write(dir.path().join(".gitignore"), "target/\n").unwrap();

    let (code, _, stderr) = run(dir.path(), &["init"]);
    assert_eq!(code, 0, "{stderr}");
    let gitignore = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
    assert!(gitignore.contains("quality/limits.txt.lock"), "{gitignore}");
    assert!(gitignore.contains("quality/limits.txt.tmp"), "{gitignore}");
    assert!(!gitignore.contains("static-analysis"), "{gitignore}");

    // a second init does not append the entries again
    run(dir.path(), &["init"]);
    let again = fs::read_to_string(dir.path().join(".gitignore")).unwrap();
    assert_eq!(again, gitignore);
}

#[test]
fn test_init_fails_on_unreadable_gitignore() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir(dir.path().join(".gitignore")).unwrap();

    let (code, _, stderr) = run(dir.path(), &["init"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Failed to read"), "{stderr}");
}

#[test]
fn test_limits_set_rejects_key_that_cannot_reload() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run(dir.path(), &["limits", "set", "pmd:main", "5"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("invalid limits key"), "{stderr}");
    assert!(!dir.path().join("static-analysis.properties").exists());
}
