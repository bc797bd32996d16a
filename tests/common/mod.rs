use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use kickoff_bot::config::Config;
use kickoff_bot::notifier::Notifier;
use kickoff_bot::notifier::NotifyError;
use kickoff_bot::service::Services;
use kickoff_bot::source::Fixture;
use kickoff_bot::source::FixtureSource;
use kickoff_bot::source::SourceInfo;
use kickoff_bot::source::error::SourceError;
use uuid::Uuid;

pub fn setup_data_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("kickoff-bot-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("Failed to create temp directory");
    dir
}

pub fn teardown_data_dir(dir: PathBuf) {
    if dir.exists() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

/// Loads a response file from `tests/responses`.
#[allow(dead_code)]
pub fn get_response(filename: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests/responses");
    path.push(filename);
    std::fs::read_to_string(path).expect("Failed to read response file")
}

/// Dry-run configuration storing its state under `data_path`, displayed in UTC.
#[allow(dead_code)]
pub fn test_config(data_path: &Path) -> Config {
    let vars: HashMap<&str, String> = HashMap::from([
        ("DRY_RUN", "true".to_string()),
        ("DATA_PATH", data_path.to_string_lossy().to_string()),
        ("TIMEZONE_OFFSET", "+00:00".to_string()),
        ("TIMEZONE_LABEL", "UTC".to_string()),
    ]);
    Config::from_lookup(|key| vars.get(key).cloned()).expect("Failed to build config")
}

#[allow(dead_code)]
pub fn setup_services(
    config: &Config,
    source: Arc<StaticSource>,
    notifier: Arc<RecordingNotifier>,
) -> Arc<Services> {
    Arc::new(Services::new(config, source, notifier).expect("Failed to create services"))
}

// MOCK SOURCE

/// Serves a fixed list of fixtures, or fails when told to.
#[allow(dead_code)]
pub struct StaticSource {
    info: SourceInfo,
    fixtures: RwLock<Vec<Fixture>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl StaticSource {
    pub fn new(fixtures: Vec<Fixture>) -> Arc<Self> {
        Arc::new(Self {
            info: SourceInfo {
                name: "Static".to_string(),
                api_url: "http://localhost".to_string(),
            },
            fixtures: RwLock::new(fixtures),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn set_fixtures(&self, fixtures: Vec<Fixture>) {
        *self.fixtures.write().unwrap() = fixtures;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FixtureSource for StaticSource {
    async fn fetch_fixtures(&self) -> Result<Vec<Fixture>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::ApiError {
                message: "source is down".to_string(),
            });
        }
        Ok(self.fixtures.read().unwrap().clone())
    }

    fn info(&self) -> &SourceInfo {
        &self.info
    }
}

// MOCK NOTIFIER

/// Records every delivered message. Chats in `failing` get an error instead.
#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(i64, String)>>,
    failing: Mutex<Vec<i64>>,
    delay: Mutex<Duration>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every send take `delay` before it is recorded.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = delay;
    }

    pub fn fail_for(&self, chat_id: i64) {
        self.failing.lock().unwrap().push(chat_id);
    }

    pub fn messages(&self) -> Vec<(i64, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn messages_for(&self, chat_id: i64) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, text)| text)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, chat_id: i64, text: &str) -> Result<(), NotifyError> {
        let delay = *self.delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(&chat_id) {
            return Err(NotifyError::Rejected {
                chat_id,
                reason: "test failure".to_string(),
            });
        }
        self.messages
            .lock()
            .unwrap()
            .push((chat_id, text.to_string()));
        Ok(())
    }
}
