//! Layout-preserving translation through an opaque text-to-text service.
//!
//! Fragments go out as `text(x1,y1,x2,y2)` tokens and come back as a literal
//! list of `(text, box)` pairs, so translated text can be laid out on the
//! same grid as the source.

pub mod command;
pub mod parse;
pub mod prompt;
pub mod retry;

use std::time::Duration;

use anyhow::Result;
use tracing::{error, info};

use crate::core::config::TranslateConfig;
use crate::core::error::ScanLayoutError;
use crate::core::model::TextFragment;

pub use command::CommandTranslator;
pub use parse::parse_translation;
pub use prompt::{build_prompt, serialize_fragments};
pub use retry::with_retries;

/// A text-to-text completion service.
pub trait Translator {
    fn complete(&self, prompt: &str) -> Result<String>;
}

/// Translates one page of fragments.
///
/// Each attempt covers the call and the parse of its reply. After the last
/// failed attempt the page's translation is abandoned and an empty vector is
/// returned; this function never fails outright.
pub fn translate_page(
    translator: &dyn Translator,
    fragments: &[TextFragment],
    config: &TranslateConfig,
) -> Vec<TextFragment> {
    if fragments.is_empty() {
        return Vec::new();
    }
    let prompt = build_prompt(fragments, &config.source_lang, &config.target_lang);
    let delay = Duration::from_millis(config.retry_delay_ms);

    let outcome = with_retries(config.max_retries, delay, |attempt| {
        info!(
            attempt,
            max = config.max_retries,
            items = fragments.len(),
            "requesting translation"
        );
        let reply = translator.complete(&prompt)?;
        if reply.trim().is_empty() {
            return Err(ScanLayoutError::EmptyTranslation.into());
        }
        Ok(parse_translation(&reply)?)
    });

    match outcome {
        Ok(translated) => {
            info!(items = translated.len(), "translation succeeded");
            translated
        }
        Err(err) => {
            error!(error = %err, "translation abandoned for page");
            Vec::new()
        }
    }
}
