use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::providers;
use crate::signing::SignContext;
use crate::transform::Transformer;

/// Sub-provider tag → [`Transformer`] map, safe for concurrent lookups.
///
/// Registering a tag again replaces the previous transformer.
#[derive(Default)]
pub struct TransformerRegistry {
    transformers: RwLock<HashMap<String, Arc<dyn Transformer>>>,
}

impl fmt::Debug for TransformerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformerRegistry")
            .field("tags", &self.tags())
            .finish()
    }
}

impl TransformerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding all twelve built-in vendors, signing with the system
    /// clock and random nonces.
    pub fn with_defaults() -> Self {
        Self::with_context(SignContext::default())
    }

    /// Registry holding all twelve built-in vendors, signing with `ctx`.
    pub fn with_context(ctx: SignContext) -> Self {
        let registry = Self::new();
        for transformer in providers::all(&ctx) {
            registry.register(transformer);
        }
        registry
    }

    /// Register under the transformer's own tag, returning the replaced entry.
    pub fn register(&self, transformer: Arc<dyn Transformer>) -> Option<Arc<dyn Transformer>> {
        let tag = transformer.sub_provider().to_owned();
        self.register_as(&tag, transformer)
    }

    /// Register under an explicit tag (normalized to lowercase).
    pub fn register_as(
        &self,
        tag: &str,
        transformer: Arc<dyn Transformer>,
    ) -> Option<Arc<dyn Transformer>> {
        self.transformers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tag.to_ascii_lowercase(), transformer)
    }

    pub fn get(&self, tag: &str) -> Option<Arc<dyn Transformer>> {
        self.transformers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&tag.to_ascii_lowercase())
            .cloned()
    }

    /// Registered tags, sorted.
    pub fn tags(&self) -> Vec<String> {
        let mut tags = self
            .transformers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect::<Vec<_>>();
        tags.sort();
        tags
    }
}

static GLOBAL: OnceLock<TransformerRegistry> = OnceLock::new();

/// Process-wide registry, populated with the built-in vendors on first use.
pub fn global_registry() -> &'static TransformerRegistry {
    GLOBAL.get_or_init(TransformerRegistry::with_defaults)
}

pub fn register_transformer(
    tag: &str,
    transformer: Arc<dyn Transformer>,
) -> Option<Arc<dyn Transformer>> {
    global_registry().register_as(tag, transformer)
}

pub fn get_transformer(tag: &str) -> Option<Arc<dyn Transformer>> {
    global_registry().get(tag)
}
