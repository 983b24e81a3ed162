//! Scripted Summarizer backend for tests.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use crate::claude::ai::AiClient;
use crate::claude::prompts::SYSTEM_PROMPT;
use crate::data::ChangeCategory;

/// Renders a `changes:` answer the way the model is asked to write it.
pub(crate) fn change_list(changes: &[(&str, ChangeCategory, &[&str])]) -> String {
    if changes.is_empty() {
        return "changes: []\n".to_string();
    }
    let mut yaml = String::from("changes:\n");
    for (summary, category, commits) in changes {
        yaml.push_str(&format!(
            "  - summary: \"{summary}\"\n    category: {category}\n    contributing_commits: [{}]\n",
            commits.join(", ")
        ));
    }
    yaml
}

/// Backend that answers Summarizer calls from a script, in order.
///
/// Every call must carry the fixed system prompt. The user prompt of each
/// call is kept so tests can see which commits reached which batch. Once
/// the script runs out, calls fail.
pub(crate) struct ScriptedAiClient {
    answers: Mutex<VecDeque<Result<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedAiClient {
    pub(crate) fn new(answers: Vec<Result<String>>) -> Self {
        Self {
            answers: Mutex::new(answers.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Returns a view of the calls made, usable after the client is boxed.
    pub(crate) fn call_log(&self) -> CallLog {
        CallLog {
            calls: Arc::clone(&self.calls),
        }
    }
}

/// User prompts received by a [`ScriptedAiClient`].
pub(crate) struct CallLog {
    calls: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    pub(crate) fn count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub(crate) fn prompt(&self, call: usize) -> String {
        self.calls.lock().unwrap()[call].clone()
    }

    /// Abbreviated hashes of the commits rendered into one call.
    pub(crate) fn commits_sent(&self, call: usize) -> Vec<String> {
        self.prompt(call)
            .lines()
            .filter_map(|line| line.strip_prefix("Commit: "))
            .map(String::from)
            .collect()
    }
}

impl AiClient for ScriptedAiClient {
    fn model(&self) -> &str {
        "scripted"
    }

    fn send_request<'a>(
        &'a self,
        system_prompt: &'a str,
        user_prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        assert_eq!(system_prompt, SYSTEM_PROMPT, "Summarizer sent a foreign system prompt");
        self.calls.lock().unwrap().push(user_prompt.to_string());
        let answer = self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow::anyhow!("script exhausted")));
        Box::pin(async move { answer })
    }
}
