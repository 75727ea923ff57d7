//! Mock capability implementations for tests.
//!
//! Each mock records the calls made against it behind an `Arc<RwLock<..>>`
//! so tests can assert on interaction order and count after the pipeline
//! has run. The mocks are cheap to clone-configure with `with_*` builders.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{ExtractError, Result};
use crate::traits::{Completer, OcrEngine, PdfDecoder};
use crate::types::page::{DecodedPage, PageImage};

fn boxed_failure(msg: &str) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::other(msg.to_string()))
}

/// A PDF decoder that returns a preconfigured set of pages.
#[derive(Clone, Default)]
pub struct MockDecoder {
    pages: Vec<DecodedPage>,
    fail: bool,
    calls: Arc<RwLock<usize>>,
}

impl MockDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a page with the given native text (and an empty image).
    pub fn with_page(mut self, native_text: &str) -> Self {
        let index = self.pages.len();
        self.pages.push(DecodedPage::new(index, native_text));
        self
    }

    /// Make every decode call fail.
    pub fn fail(mut self) -> Self {
        self.fail = true;
        self
    }

    /// How many times decode was called.
    pub fn calls(&self) -> usize {
        *self.calls.read().unwrap()
    }
}

#[async_trait]
impl PdfDecoder for MockDecoder {
    async fn decode(&self, _bytes: &[u8]) -> Result<Vec<DecodedPage>> {
        *self.calls.write().unwrap() += 1;
        if self.fail {
            return Err(ExtractError::Decode(boxed_failure("mock decode failure")));
        }
        Ok(self.pages.clone())
    }
}

/// An OCR engine that returns preconfigured text per page index.
///
/// Pages without configured text recognize as empty strings; pages marked
/// with [`MockOcr::fail_page`] return an error instead.
#[derive(Clone, Default)]
pub struct MockOcr {
    texts: HashMap<usize, String>,
    failures: HashSet<usize>,
    delay: Option<Duration>,
    calls: Arc<RwLock<Vec<usize>>>,
}

impl MockOcr {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recognized text for one page index.
    pub fn with_text(mut self, page_index: usize, text: &str) -> Self {
        self.texts.insert(page_index, text.to_string());
        self
    }

    /// Make recognition fail for one page index.
    pub fn fail_page(mut self, page_index: usize) -> Self {
        self.failures.insert(page_index);
        self
    }

    /// Sleep this long before answering, to exercise timeout paths.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// The page indices recognize was called with, in call order.
    pub fn calls(&self) -> Vec<usize> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl OcrEngine for MockOcr {
    async fn recognize(&self, image: &PageImage) -> Result<String> {
        self.calls.write().unwrap().push(image.index);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failures.contains(&image.index) {
            return Err(ExtractError::Ocr(boxed_failure("mock OCR failure")));
        }
        Ok(self.texts.get(&image.index).cloned().unwrap_or_default())
    }
}

enum ScriptedReply {
    Text(String),
    Failure,
}

/// A completer that replays a scripted queue of responses.
///
/// Responses queued with [`MockCompleter::with_response`] (or failures
/// queued with [`MockCompleter::fail_next`]) are consumed in FIFO order;
/// once the queue is drained, the default response (empty unless set with
/// [`MockCompleter::with_default`]) is returned. Every prompt passed to
/// `complete` is recorded for assertions.
#[derive(Clone, Default)]
pub struct MockCompleter {
    script: Arc<RwLock<VecDeque<ScriptedReply>>>,
    default: Option<String>,
    delay: Option<Duration>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockCompleter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one response.
    pub fn with_response(self, text: &str) -> Self {
        self.script
            .write()
            .unwrap()
            .push_back(ScriptedReply::Text(text.to_string()));
        self
    }

    /// Queue one transport failure.
    pub fn fail_next(self) -> Self {
        self.script.write().unwrap().push_back(ScriptedReply::Failure);
        self
    }

    /// The response to return once the scripted queue is drained.
    pub fn with_default(mut self, text: &str) -> Self {
        self.default = Some(text.to_string());
        self
    }

    /// Sleep this long before answering, to exercise timeout paths.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// The prompts complete was called with, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Completer for MockCompleter {
    async fn complete(&self, prompt: &str, _response_budget: usize) -> Result<String> {
        self.calls.write().unwrap().push(prompt.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.script.write().unwrap().pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Failure) => {
                Err(ExtractError::Completion(boxed_failure("mock completion failure")))
            }
            None => Ok(self.default.clone().unwrap_or_default()),
        }
    }
}
