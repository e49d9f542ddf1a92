//! Tests for configuration loading.

use std::fs;
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use jaat_chat::config::{
    ChatConfig, ENV_CONFIG_FILE, ENV_DATA_DIR, ENV_KEY_PREFIX, ENV_PRODUCT_NAME,
    ENV_THINKING_DELAY_MS, ENV_THINKING_JITTER_MS,
};
use jaat_chat::error::ChatError;
use jaat_chat::session::{ChatSession, ReplyOutcome, ThinkingDelay};
use tempfile::TempDir;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 6] = [
    ENV_CONFIG_FILE,
    ENV_DATA_DIR,
    ENV_KEY_PREFIX,
    ENV_THINKING_DELAY_MS,
    ENV_THINKING_JITTER_MS,
    ENV_PRODUCT_NAME,
];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn isolated_env(dir: &TempDir) -> EnvGuard {
    let guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    for key in CONFIG_ENV_VARS {
        std::env::remove_var(key);
    }
    // keep the user's real config file out of the picture
    std::env::set_var(ENV_CONFIG_FILE, dir.path().join("config.toml"));
    guard
}

#[test]
fn from_env_reads_all_overrides() {
    let _env_lock = env_lock_guard();
    let dir = TempDir::new().unwrap();
    let _env_guard = isolated_env(&dir);

    std::env::set_var(ENV_DATA_DIR, dir.path().join("data"));
    std::env::set_var(ENV_KEY_PREFIX, "demo");
    std::env::set_var(ENV_THINKING_DELAY_MS, "5");
    std::env::set_var(ENV_THINKING_JITTER_MS, "0");
    std::env::set_var(ENV_PRODUCT_NAME, "Acme");

    let config = ChatConfig::from_env().unwrap();

    assert_eq!(config.data_dir, dir.path().join("data"));
    assert_eq!(config.key_prefix, "demo");
    assert_eq!(
        config.thinking_delay(),
        ThinkingDelay::fixed(Duration::from_millis(5))
    );
    assert_eq!(config.product_name, "Acme");
}

#[test]
fn from_env_layers_env_over_config_file() {
    let _env_lock = env_lock_guard();
    let dir = TempDir::new().unwrap();
    let _env_guard = isolated_env(&dir);

    fs::write(
        dir.path().join("config.toml"),
        "key_prefix = \"file_prefix\"\nproduct_name = \"FromFile\"\n",
    )
    .unwrap();
    std::env::set_var(ENV_PRODUCT_NAME, "FromEnv");

    let config = ChatConfig::from_env().unwrap();

    assert_eq!(config.key_prefix, "file_prefix");
    assert_eq!(config.product_name, "FromEnv");
}

#[test]
fn from_env_rejects_non_numeric_delay() {
    let _env_lock = env_lock_guard();
    let dir = TempDir::new().unwrap();
    let _env_guard = isolated_env(&dir);

    std::env::set_var(ENV_THINKING_DELAY_MS, "fast");
    let err = ChatConfig::from_env().unwrap_err();

    match err {
        ChatError::Configuration(message) => assert!(message.contains(ENV_THINKING_DELAY_MS)),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[tokio::test]
async fn session_from_config_persists_under_data_dir() {
    let dir = TempDir::new().unwrap();
    let config = ChatConfig::default()
        .with_data_dir(dir.path())
        .with_key_prefix("itest")
        .with_product_name("Acme")
        .with_thinking_delay(ThinkingDelay::none());

    let mut session = ChatSession::from_config(&config).unwrap();
    session.open().unwrap();
    let pending = session.submit("thank you").unwrap().unwrap();
    let ReplyOutcome::Delivered(conversation) = pending.deliver().await.unwrap() else {
        panic!("reply should be delivered");
    };
    assert!(conversation.messages[1].content.contains("Acme"));
    assert!(dir.path().join("itest_conversations").exists());
    assert!(dir.path().join("itest_active_conversation").exists());

    let reopened = ChatSession::from_config(&config).unwrap();
    let store = Arc::clone(reopened.store());
    assert_eq!(store.list_conversations(), vec![conversation]);
}

#[test]
fn session_from_config_rejects_prefix_that_normalizes_differently() {
    let dir = TempDir::new().unwrap();
    let config = ChatConfig::default()
        .with_data_dir(dir.path())
        .with_key_prefix("My.App");

    let err = ChatSession::from_config(&config).unwrap_err();
    assert!(matches!(err, ChatError::Configuration(_)));
}
