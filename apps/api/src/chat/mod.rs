// Chat relay: normalize the visitor's thread, classify intent, call the
// completion API, then decide whether to append a call-to-action.
// All completion calls go through llm_client.

pub mod augmenter;
pub mod handlers;
pub mod intent;
pub mod link_guard;
pub mod models;
pub mod normalizer;
pub mod pipeline;
