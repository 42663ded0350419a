//! Shared fakes for knowledge base tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use factcheck_rag::{EmbeddingProvider, RagError, Result, ServiceErrorKind};

pub const DIM: usize = 64;

/// Deterministic bag-of-words embedder: each lowercase word longer than three
/// characters adds a signed unit to a hashed bucket.
#[derive(Default)]
pub struct HashingEmbedder {
    pub batch_calls: AtomicUsize,
}

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

pub fn embed_words(text: &str) -> Vec<f32> {
    let mut v = vec![0.0; DIM];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|w| w.chars().count() > 3)
    {
        let h = fnv1a(&word);
        let sign = if h & 1 == 0 { 1.0 } else { -1.0 };
        v[((h >> 1) % DIM as u64) as usize] += sign;
    }
    v
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(embed_words(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| embed_words(t)).collect())
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}

/// Embedder that replays scripted failures before succeeding.
pub struct ScriptedEmbedder {
    pub failures: Mutex<Vec<ServiceErrorKind>>,
    pub calls: AtomicUsize,
}

impl ScriptedEmbedder {
    pub fn failing(kinds: Vec<ServiceErrorKind>) -> Self {
        Self { failures: Mutex::new(kinds), calls: AtomicUsize::new(0) }
    }
}

#[async_trait]
impl EmbeddingProvider for ScriptedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(embed_words(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut failures = self.failures.lock().unwrap();
            if failures.is_empty() { None } else { Some(failures.remove(0)) }
        };
        match next {
            Some(kind) => Err(RagError::embedding("Scripted", kind, format!("injected {kind}"))),
            None => Ok(texts.iter().map(|t| embed_words(t)).collect()),
        }
    }

    fn dimensions(&self) -> usize {
        DIM
    }
}
