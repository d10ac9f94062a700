//! Shared test utilities

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use parley_gateway::capability::clip_speech_input;
use parley_gateway::{ArtifactStore, CapabilitySource, Orchestrator, Outcome};

/// Scripted capability source driving the pipeline without a network
///
/// Outcomes are served in configuration order per capability; a call with
/// an exhausted script panics so tests notice unexpected pipeline steps.
/// All calls are recorded for assertions.
#[derive(Default)]
pub struct ScriptedSource {
    transcriptions: Mutex<VecDeque<Outcome<String>>>,
    completions: Mutex<VecDeque<Outcome<String>>>,
    syntheses: Mutex<VecDeque<Outcome<Vec<u8>>>>,
    transcribe_calls: Mutex<Vec<Vec<u8>>>,
    complete_calls: Mutex<Vec<String>>,
    synthesize_calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn transcription(self, outcome: Outcome<String>) -> Self {
        self.transcriptions.lock().unwrap().push_back(outcome);
        self
    }

    #[must_use]
    pub fn completion(self, outcome: Outcome<String>) -> Self {
        self.completions.lock().unwrap().push_back(outcome);
        self
    }

    #[must_use]
    pub fn synthesis(self, outcome: Outcome<Vec<u8>>) -> Self {
        self.syntheses.lock().unwrap().push_back(outcome);
        self
    }

    /// Audio payloads passed to transcription
    pub fn transcribe_calls(&self) -> Vec<Vec<u8>> {
        self.transcribe_calls.lock().unwrap().clone()
    }

    /// Prompts passed to completion
    pub fn complete_calls(&self) -> Vec<String> {
        self.complete_calls.lock().unwrap().clone()
    }

    /// Text actually sent to synthesis, after clipping
    pub fn synthesize_calls(&self) -> Vec<String> {
        self.synthesize_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CapabilitySource for ScriptedSource {
    async fn transcribe(&self, audio: &[u8]) -> Outcome<String> {
        self.transcribe_calls.lock().unwrap().push(audio.to_vec());
        self.transcriptions
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted transcribe call")
    }

    async fn complete(&self, prompt: &str) -> Outcome<String> {
        self.complete_calls.lock().unwrap().push(prompt.to_string());
        self.completions
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted complete call")
    }

    async fn synthesize(&self, text: &str, max_chars: usize) -> Outcome<Vec<u8>> {
        // Mirrors the production client: input is clipped before the call
        let input = clip_speech_input(text, max_chars);
        self.synthesize_calls.lock().unwrap().push(input.to_string());
        self.syntheses
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted synthesize call")
    }
}

/// Minimal WAV-ish payload for synthesized audio fixtures
pub fn wav_bytes() -> Vec<u8> {
    b"RIFF\x24\x00\x00\x00WAVEfmt ".to_vec()
}

/// Build an orchestrator plus its artifact store over a scripted source
pub fn build_pipeline(source: Arc<ScriptedSource>) -> (Orchestrator, Arc<ArtifactStore>) {
    let artifacts = Arc::new(ArtifactStore::new().expect("failed to create artifact store"));
    let orchestrator = Orchestrator::new(source, Arc::clone(&artifacts));
    (orchestrator, artifacts)
}
