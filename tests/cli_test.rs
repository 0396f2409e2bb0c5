use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn lmstudio() -> Command {
    let mut cmd = Command::cargo_bin("lmstudio").unwrap();
    cmd.env_remove("LM_STUDIO_API_BASE_URL");
    cmd
}

#[test]
fn setup_writes_env_file() {
    let temp_dir = TempDir::new().unwrap();
    let env_file = temp_dir.path().join("lmstudio.env");

    lmstudio()
        .args(["--env-file", env_file.to_str().unwrap()])
        .args(["--base-url", "http://192.168.1.20:1234/v1", "setup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved LM Studio settings"));

    let contents = std::fs::read_to_string(&env_file).unwrap();
    assert_eq!(contents, "LM_STUDIO_API_BASE_URL=http://192.168.1.20:1234/v1\n");
}

#[test]
fn env_file_supplies_base_url() {
    let temp_dir = TempDir::new().unwrap();
    let env_file = temp_dir.path().join(".env");
    std::fs::write(&env_file, "LM_STUDIO_API_BASE_URL=http://10.1.1.1:9999/v1\n").unwrap();

    // Without --base-url the loaded value is written back rather than the default
    lmstudio()
        .args(["--env-file", env_file.to_str().unwrap(), "setup"])
        .assert()
        .success();

    assert_eq!(
        std::fs::read_to_string(&env_file).unwrap(),
        "LM_STUDIO_API_BASE_URL=http://10.1.1.1:9999/v1\n"
    );
}

#[test]
fn models_lists_server_models() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"data": [{"id": "qwen"}, {"id": "nomic-embed"}]})),
            )
            .mount(&server)
            .await;
        server
    });

    let uri = server.uri();
    let temp_dir = TempDir::new().unwrap();
    lmstudio()
        .args(["--env-file", temp_dir.path().join(".env").to_str().unwrap()])
        .args(["--base-url", uri.as_str(), "models"])
        .assert()
        .success()
        .stdout("qwen\nnomic-embed\n");
}

#[test]
fn unreachable_server_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    lmstudio()
        .args(["--env-file", temp_dir.path().join(".env").to_str().unwrap()])
        .args(["--base-url", "http://127.0.0.1:9/v1", "--timeout", "2"])
        .args(["chat", "--model", "m", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to send request"));
}
