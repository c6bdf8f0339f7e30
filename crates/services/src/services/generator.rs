use std::time::Duration;

use futures::stream::{self, BoxStream, StreamExt};
use rand::{Rng, distributions::Alphanumeric};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("response generator failed: {0}")]
pub struct GeneratorError(pub String);

/// Finite stream of incremental response fragments for one exchange.
pub type FragmentStream = BoxStream<'static, Result<String, GeneratorError>>;

/// Produces the AI reply for a user message as a lazy fragment sequence.
///
/// Streams are single-use: a fresh call always yields a fresh (possibly
/// different) sequence. Determinism is neither guaranteed nor required.
/// In production this seat is taken by an external text-generation service.
pub trait ResponseGenerator: Send + Sync {
    fn generate(&self, user_message: &str) -> FragmentStream;
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Wait before the first fragment, emulating model warm-up latency.
    pub first_fragment_delay: Duration,
    pub inter_fragment_delay: Duration,
    pub min_fragments: u32,
    pub max_fragments: u32,
    pub fragment_len: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            first_fragment_delay: Duration::from_secs(2),
            inter_fragment_delay: Duration::from_millis(75),
            min_fragments: 20,
            max_fragments: 100,
            fragment_len: 5,
        }
    }
}

/// Placeholder generator: random alphanumeric fragments behind configurable
/// delays, so coordinator behavior under slow producers stays exercised.
pub struct SimulatedGenerator {
    config: GeneratorConfig,
}

impl SimulatedGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }
}

impl ResponseGenerator for SimulatedGenerator {
    fn generate(&self, _user_message: &str) -> FragmentStream {
        let config = self.config.clone();
        let count = rand::thread_rng().gen_range(config.min_fragments..=config.max_fragments);

        stream::unfold(0u32, move |emitted| {
            let config = config.clone();
            async move {
                if emitted >= count {
                    return None;
                }
                let delay = if emitted == 0 {
                    config.first_fragment_delay
                } else {
                    config.inter_fragment_delay
                };
                tokio::time::sleep(delay).await;

                let fragment: String = rand::thread_rng()
                    .sample_iter(&Alphanumeric)
                    .take(config.fragment_len)
                    .map(char::from)
                    .collect();
                Some((Ok(fragment), emitted + 1))
            }
        })
        .boxed()
    }
}

/// Deterministic generator for tests and local experiments: replays a fixed
/// fragment list, optionally failing partway through.
pub struct ScriptedGenerator {
    fragments: Vec<String>,
    fragment_delay: Duration,
    fail_after: Option<usize>,
}

impl ScriptedGenerator {
    pub fn new<S: Into<String>>(fragments: Vec<S>) -> Self {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            fragment_delay: Duration::ZERO,
            fail_after: None,
        }
    }

    /// Delay applied before every fragment, to emulate a slow producer.
    pub fn with_fragment_delay(mut self, delay: Duration) -> Self {
        self.fragment_delay = delay;
        self
    }

    /// Yield `count` fragments, then error instead of finishing.
    pub fn failing_after(mut self, count: usize) -> Self {
        self.fail_after = Some(count);
        self
    }
}

impl ResponseGenerator for ScriptedGenerator {
    fn generate(&self, _user_message: &str) -> FragmentStream {
        let fragments = self.fragments.clone();
        let delay = self.fragment_delay;
        let fail_after = self.fail_after;

        stream::unfold(0usize, move |index| {
            let fragments = fragments.clone();
            async move {
                if fail_after == Some(index) {
                    return Some((
                        Err(GeneratorError("scripted failure".to_string())),
                        index + 1,
                    ));
                }
                let fragment = fragments.get(index)?.clone();
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Some((Ok(fragment), index + 1))
            }
        })
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    #[tokio::test]
    async fn simulated_generator_respects_configured_bounds() {
        let generator = SimulatedGenerator::new(GeneratorConfig {
            first_fragment_delay: Duration::ZERO,
            inter_fragment_delay: Duration::ZERO,
            min_fragments: 3,
            max_fragments: 3,
            fragment_len: 5,
        });

        let fragments: Vec<String> = generator
            .generate("hello")
            .map(|fragment| fragment.unwrap())
            .collect()
            .await;

        assert_eq!(fragments.len(), 3);
        for fragment in fragments {
            assert_eq!(fragment.len(), 5);
            assert!(fragment.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[tokio::test]
    async fn scripted_generator_replays_and_fails_on_cue() {
        let generator = ScriptedGenerator::new(vec!["ab", "cd", "ef"]).failing_after(2);
        let mut stream = generator.generate("hello");

        assert_eq!(stream.next().await.unwrap().unwrap(), "ab");
        assert_eq!(stream.next().await.unwrap().unwrap(), "cd");
        assert!(stream.next().await.unwrap().is_err());
    }
}
