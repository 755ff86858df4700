//! Token counting and output-budget computation.
//!
//! Before every completion request the prompt is counted with the model's
//! own tokenizer so the requested output allowance can be sized to what the
//! provider will actually accept:
//!
//! ```text
//! budget = min(context_limit − input_tokens, model_output_limit, hard_cap)
//! ```
//!
//! A prompt that fills the context window is a [`ForgeError::BudgetExhausted`]
//! error — the budget is never allowed to go negative and a zero-token
//! request is never sent.

use crate::error::ForgeError;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tiktoken_rs::{cl100k_base, get_bpe_from_model, CoreBPE};

/// Context-window and output ceilings for one model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelLimits {
    /// Total context window in tokens (input + output).
    pub context: usize,
    /// Provider-side maximum output tokens for one completion.
    pub output: usize,
}

/// Limits applied to models missing from the table.
const DEFAULT_LIMITS: ModelLimits = ModelLimits {
    context: 200_000,
    output: 100_000,
};

/// Per-model limits table.
///
/// Values mirror the provider's published ceilings; unknown models get
/// [`DEFAULT_LIMITS`], which errs generous on context and lets the
/// application hard cap do the real limiting.
pub fn limits_for(model: &str) -> ModelLimits {
    match model {
        "o4-mini" => ModelLimits {
            context: 200_000,
            output: 100_000,
        },
        "gpt-4o" => ModelLimits {
            context: 128_000,
            output: 16_384,
        },
        "gpt-3.5-turbo" => ModelLimits {
            context: 16_000,
            output: 4_096,
        },
        "gpt-4.1-nano-2025-04-14" => ModelLimits {
            context: 1_047_576,
            output: 32_768,
        },
        "gpt-oss-120b" => ModelLimits {
            context: 131_072,
            output: 131_072,
        },
        _ => DEFAULT_LIMITS,
    }
}

// BPE construction parses ~100k merge rules, so encoders are cached per
// model name. The fallback is shared by every model tiktoken doesn't know.
static FALLBACK_BPE: Lazy<Arc<CoreBPE>> =
    Lazy::new(|| Arc::new(cl100k_base().expect("embedded cl100k_base vocabulary")));

static ENCODERS: Lazy<Mutex<HashMap<String, Arc<CoreBPE>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn encoder_for(model: &str) -> Arc<CoreBPE> {
    let mut cache = ENCODERS.lock().unwrap();
    if let Some(bpe) = cache.get(model) {
        return Arc::clone(bpe);
    }
    let bpe = match get_bpe_from_model(model) {
        Ok(bpe) => Arc::new(bpe),
        Err(_) => Arc::clone(&FALLBACK_BPE),
    };
    cache.insert(model.to_string(), Arc::clone(&bpe));
    bpe
}

/// Count the tokens `text` occupies under `model`'s tokenizer.
///
/// Unknown models fall back to the `cl100k_base` encoding.
pub fn count_tokens(text: &str, model: &str) -> usize {
    encoder_for(model).encode_ordinary(text).len()
}

/// Compute the maximum output tokens to request for `prompt` under `model`.
///
/// `hard_cap` is the application-level ceiling
/// ([`crate::config::ForgeConfig::output_token_cap`]). Returns
/// [`ForgeError::BudgetExhausted`] when the prompt leaves no room for
/// output.
pub fn output_budget(prompt: &str, model: &str, hard_cap: usize) -> Result<usize, ForgeError> {
    let input_tokens = count_tokens(prompt, model);
    let limits = limits_for(model);

    let available = limits.context.saturating_sub(input_tokens);
    if available == 0 {
        return Err(ForgeError::BudgetExhausted {
            model: model.to_string(),
            input_tokens,
            context_limit: limits.context,
        });
    }

    Ok(available.min(limits.output).min(hard_cap))
}
