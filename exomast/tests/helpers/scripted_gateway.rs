//! In-memory gateway serving canned bodies and recording every request

use exomast::{ClientOptions, ExomastError, Gateway, Result};
use exomast_common::config::ServiceSettings;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const API_BASE: &str = "https://exo.test/api/v0.1";

/// Gateway answering from a URL → body script
///
/// Clones share the request log, so a test can keep one clone and hand
/// the other to the client.
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    responses: Arc<Mutex<HashMap<String, String>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `path` (relative to [`API_BASE`])
    pub fn respond(self, path: &str, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(format!("{}{}", API_BASE, path), body.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn count_matching(&self, pattern: &str) -> usize {
        self.requests()
            .iter()
            .filter(|url| url.contains(pattern))
            .count()
    }
}

impl Gateway for ScriptedGateway {
    fn get(&self, url: &str) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| ExomastError::NotFound(url.to_string()))
    }
}

/// Options pointing at [`API_BASE`] with the cache under `cache_dir`
pub fn test_options(cache_dir: &Path, quickstart: bool) -> ClientOptions {
    ClientOptions {
        settings: ServiceSettings {
            api_url: "https://exo.test/api".to_string(),
            api_version: "0.1".to_string(),
            cache_dir: cache_dir.to_path_buf(),
            timeout: None,
            log_level: "info".to_string(),
        },
        verbose: false,
        quickstart,
    }
}
