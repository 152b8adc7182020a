//! The parser (C9): drives the injected JSON-LD processor's expansion
//! step, then hands the result to the loader.

use serde_json::Value;

use crate::error::{Result, ResultExt};
use crate::options::ParseOptions;
use crate::processor::{ExpandOptions, JsonLdProcessor};
use crate::remote::LoadRemoteDocument;
use crate::store::GraphStore;

/// Expands `input` via `processor`, then loads the resulting entities into
/// `store` (running the normalizer afterward if configured).
pub(crate) async fn parse_into<P, L>(
    store: &mut GraphStore,
    input: Value,
    processor: &P,
    loader: &L,
    options: ParseOptions,
) -> Result<()>
where
    L: LoadRemoteDocument,
    P: JsonLdProcessor<L>,
{
    let expand_options = ExpandOptions {
        base: options.load.base.as_deref(),
        expand_context: options.expand_context.as_ref(),
    };
    let expanded = processor
        .expand(&input, expand_options, loader)
        .await
        .context("injected processor failed to expand the input document")?;
    crate::loader::load_into(store, Value::Array(expanded), &options.load)?;
    if options.load.normalize {
        crate::normalize::normalize(store, options.load.unique)?;
    }
    Ok(())
}
