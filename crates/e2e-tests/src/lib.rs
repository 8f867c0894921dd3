//! End-to-end test infrastructure for chat topic clustering.
//!
//! Provides message builders, seeded chat generators and a temp-dir harness
//! for tests that drive the CLI pipeline through the filesystem.

use std::path::{Path, PathBuf};

use chat_topics::ClusteringConfig;
use chat_types::{Message, Topic};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Shared harness for tests that read and write batch files.
pub struct TestHarness {
    /// Keeps temp dir alive for the lifetime of the harness
    pub _temp_dir: tempfile::TempDir,
    /// Directory holding input batches
    pub input_dir: PathBuf,
    /// Directory receiving topics.json / profiles.json
    pub output_dir: PathBuf,
}

impl TestHarness {
    /// Create a harness with empty input and output directories.
    pub fn new() -> Self {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let input_dir = temp_dir.path().join("input");
        let output_dir = temp_dir.path().join("output");
        std::fs::create_dir_all(&input_dir).expect("Failed to create input dir");

        Self {
            _temp_dir: temp_dir,
            input_dir,
            output_dir,
        }
    }

    /// Write `messages` as a JSON batch file in the input directory.
    pub fn write_batch(&self, name: &str, messages: &[Message]) -> PathBuf {
        let path = self.input_dir.join(name);
        let json = serde_json::to_vec_pretty(messages).expect("Failed to serialize batch");
        std::fs::write(&path, json).expect("Failed to write batch");
        path
    }

    /// Read a JSON file from the output directory.
    pub fn read_output<T: serde::de::DeserializeOwned>(&self, name: &str) -> T {
        read_json(&self.output_dir.join(name))
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

/// Deserialize a JSON file.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> T {
    let bytes = std::fs::read(path).expect("Failed to read output file");
    serde_json::from_slice(&bytes).expect("Failed to parse output file")
}

/// Message whose sender name equals its sender id.
pub fn msg(id: &str, timestamp: i64, sender: &str, text: &str) -> Message {
    Message::new(id, timestamp, sender, sender, text)
}

/// Messages `m0..mN` at the given timestamps, alternating senders `A` and `B`.
pub fn messages_at(timestamps: &[i64]) -> Vec<Message> {
    timestamps
        .iter()
        .enumerate()
        .map(|(i, &ts)| {
            let sender = if i % 2 == 0 { "A" } else { "B" };
            msg(&format!("m{i}"), ts, sender, &format!("message {i}"))
        })
        .collect()
}

/// Configuration with a fixed window and both merge stages off.
pub fn fixed_window_config(window_secs: i64) -> ClusteringConfig {
    ClusteringConfig {
        time_window: window_secs,
        enable_adaptive_window: false,
        enable_reply_chain: false,
        enable_semantic: false,
        ..Default::default()
    }
}

/// Member ids of each topic, in topic order.
pub fn member_ids(topics: &[Topic]) -> Vec<Vec<String>> {
    topics.iter().map(|t| t.message_ids.clone()).collect()
}

/// Vocabulary for generated chats, including CJK text and media placeholders.
const CHAT_WORDS: &[&str] = &[
    "deploy", "release", "rollback", "lunch", "noodles", "hiking", "trail", "bug", "panic",
    "tokio", "review", "merge", "weekend", "[图片]", "[表情]", "周末", "爬山", "吃饭",
];

/// Generate a timestamp-ordered chat with bursts, gaps and replies.
///
/// Some replies point at ids outside the batch. Same seed, same chat.
pub fn random_chat(seed: u64, len: usize) -> Vec<Message> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut ts = 1_700_000_000i64;
    let mut messages = Vec::with_capacity(len);

    for i in 0..len {
        ts += if rng.random_bool(0.1) {
            rng.random_range(600..5_000)
        } else {
            rng.random_range(0..60)
        };
        let words: Vec<&str> = (0..rng.random_range(0..6))
            .map(|_| CHAT_WORDS[rng.random_range(0..CHAT_WORDS.len())])
            .collect();
        let sender = format!("u{}", rng.random_range(0..5));
        let mut message = Message::new(format!("m{i}"), ts, &sender, &sender, words.join(" "));
        if i > 0 && rng.random_bool(0.15) {
            message = message.with_quote(format!("m{}", rng.random_range(0..i + 5)));
        }
        messages.push(message);
    }

    messages
}
