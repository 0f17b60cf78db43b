pub mod local;

use crate::errors::PromptError;
use async_trait::async_trait;
use dyn_clone::DynClone;
use futures::stream::{self, BoxStream, StreamExt};
use std::fmt::Debug;

/// Text deltas of a streamed reply, in order.
pub type TextStream = BoxStream<'static, Result<String, PromptError>>;

/// A trait for interacting with an AI provider.
///
/// Replies are expected to end with a `<metadata>` block; providers return
/// them raw and leave sanitizing to the caller.
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a complete response from a given system and user prompt.
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, PromptError>;

    /// Generates a response as a stream of text deltas.
    ///
    /// Providers without native streaming yield the whole reply as one delta.
    async fn generate_stream(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<TextStream, PromptError> {
        let text = self.generate(system_prompt, user_prompt).await?;
        Ok(stream::once(async move { Ok(text) }).boxed())
    }
}

dyn_clone::clone_trait_object!(AiProvider);
