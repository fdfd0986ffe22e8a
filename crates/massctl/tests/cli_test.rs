//! Integration tests for the `massctl` binary.
//!
//! Parsing, help, completions and config handling run without a server;
//! the remaining tests drive the binary against an in-process WebSocket
//! server.
#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;

use assert_cmd::cargo::cargo_bin_cmd;
use futures_util::{SinkExt, StreamExt};
use predicates::prelude::*;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `massctl` binary with env isolation.
///
/// Points config directories at `home` so tests never touch the user's
/// real configuration.
fn massctl_cmd(home: &std::path::Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("massctl");
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("MASSCTL_PROFILE")
        .env_remove("MASSCTL_SERVER")
        .env_remove("MASSCTL_OUTPUT")
        .env_remove("MASSCTL_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

fn players() -> Value {
    json!([
        {
            "player_id": "kitchen",
            "provider": "sonos",
            "type": "player",
            "name": "Kitchen",
            "available": true,
            "powered": true,
            "state": "playing",
            "volume_level": 30,
            "volume_muted": false,
        },
        {
            "player_id": "attic",
            "provider": "sonos",
            "type": "player",
            "name": "Attic",
            "available": false,
        }
    ])
}

/// Serve greetings and canned results on a background runtime. Every
/// command not listed returns `null`.
fn spawn_server() -> (SocketAddr, tokio::runtime::Runtime) {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let listener = rt.block_on(TcpListener::bind("127.0.0.1:0")).unwrap();
    let addr = listener.local_addr().unwrap();

    rt.spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                let greeting = json!({"server_version": "2.5.0", "schema_version": 27});
                if ws.send(Message::Text(greeting.to_string().into())).await.is_err() {
                    return;
                }
                while let Some(Ok(Message::Text(text))) = ws.next().await {
                    let cmd: Value = serde_json::from_str(text.as_str()).unwrap();
                    let result = match cmd["command"].as_str().unwrap_or_default() {
                        "players/all" => players(),
                        "player_queues/all" | "providers/manifests" | "providers"
                        | "music/synctasks" => json!([]),
                        "info/echo" => cmd["args"].clone(),
                        "players/cmd/play" if cmd["args"]["player_id"] == "kitchen" => {
                            Value::Null
                        }
                        "players/cmd/play" => {
                            let reply = json!({
                                "message_id": cmd["message_id"],
                                "error_code": 999,
                                "details": "Player is off",
                            });
                            let _ = ws.send(Message::Text(reply.to_string().into())).await;
                            continue;
                        }
                        _ => Value::Null,
                    };
                    let reply = json!({"message_id": cmd["message_id"], "result": result});
                    if ws.send(Message::Text(reply.to_string().into())).await.is_err() {
                        return;
                    }
                }
            });
        }
    });
    (addr, rt)
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn no_args_shows_help() {
    let home = tempfile::tempdir().unwrap();
    let output = massctl_cmd(home.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("Usage"));
}

#[test]
fn help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    massctl_cmd(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("players")
                .and(predicate::str::contains("queues"))
                .and(predicate::str::contains("watch")),
        );
}

#[test]
fn version_flag() {
    let home = tempfile::tempdir().unwrap();
    massctl_cmd(home.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("massctl"));
}

#[test]
fn completions_zsh() {
    let home = tempfile::tempdir().unwrap();
    massctl_cmd(home.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn invalid_subcommand_fails() {
    let home = tempfile::tempdir().unwrap();
    let output = massctl_cmd(home.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    assert!(combined_output(&output).contains("foobar"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn config_init_then_show() {
    let home = tempfile::tempdir().unwrap();
    massctl_cmd(home.path())
        .args(["config", "init", "--server", "http://mass.local:8095"])
        .assert()
        .success();

    massctl_cmd(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.default]")
                .and(predicate::str::contains("server = \"http://mass.local:8095\"")),
        );
}

#[test]
fn config_init_rejects_bad_url() {
    let home = tempfile::tempdir().unwrap();
    massctl_cmd(home.path())
        .args(["config", "init", "--server", "ftp://mass.local"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported scheme"));
}

#[test]
fn missing_server_is_reported() {
    let home = tempfile::tempdir().unwrap();
    massctl_cmd(home.path())
        .args(["players", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No server configured"));
}

#[test]
fn unknown_profile_is_reported() {
    let home = tempfile::tempdir().unwrap();
    massctl_cmd(home.path())
        .args(["--profile", "office", "players", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Profile 'office' not found"));
}

#[test]
fn unreachable_server_exits_with_connection_code() {
    let home = tempfile::tempdir().unwrap();
    let output = massctl_cmd(home.path())
        .args(["--server", "http://127.0.0.1:1", "--timeout", "1", "players", "list"])
        .output()
        .unwrap();
    let code = output.status.code();
    assert!(
        code == Some(7) || code == Some(8),
        "unexpected exit {code:?}:\n{}",
        combined_output(&output)
    );
}

// ── Against a server ────────────────────────────────────────────────

#[test]
fn players_list_hides_unavailable() {
    let (addr, _rt) = spawn_server();
    let home = tempfile::tempdir().unwrap();
    let server = format!("http://{addr}");

    massctl_cmd(home.path())
        .args(["--server", &server, "-o", "plain", "players", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kitchen").and(predicate::str::contains("attic").not()));

    massctl_cmd(home.path())
        .args(["--server", &server, "-o", "plain", "players", "list", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("attic"));
}

#[test]
fn player_get_json() {
    let (addr, _rt) = spawn_server();
    let home = tempfile::tempdir().unwrap();
    let output = massctl_cmd(home.path())
        .args(["--server", &format!("http://{addr}"), "-o", "json", "players", "get", "kitchen"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let player: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(player["volume_level"], 30);
}

#[test]
fn volume_is_clamped() {
    let (addr, _rt) = spawn_server();
    let home = tempfile::tempdir().unwrap();
    massctl_cmd(home.path())
        .args(["--server", &format!("http://{addr}"), "volume", "kitchen", "150"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Volume of kitchen set to 100"));
}

#[test]
fn unknown_player_exits_not_found() {
    let (addr, _rt) = spawn_server();
    let home = tempfile::tempdir().unwrap();
    massctl_cmd(home.path())
        .args(["--server", &format!("http://{addr}"), "pause", "ghost"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("players list"));
}

#[test]
fn command_errors_exit_with_details() {
    let (addr, _rt) = spawn_server();
    let home = tempfile::tempdir().unwrap();

    let server = format!("http://{addr}");

    massctl_cmd(home.path())
        .args(["--server", &server, "play", "kitchen"])
        .assert()
        .success()
        .stderr(predicate::str::contains("players/cmd/play: kitchen"));

    massctl_cmd(home.path())
        .args([
            "--server",
            &server,
            "send",
            "players/cmd/play",
            "--args",
            r#"{"player_id": "attic"}"#,
        ])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("Player is off"));
}

#[test]
fn send_prints_result() {
    let (addr, _rt) = spawn_server();
    let home = tempfile::tempdir().unwrap();
    massctl_cmd(home.path())
        .args([
            "--server",
            &format!("http://{addr}"),
            "-o",
            "json-compact",
            "send",
            "info/echo",
            "--args",
            r#"{"hello": "world"}"#,
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"hello":"world"}"#));
}
