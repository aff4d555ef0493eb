//! These models represent the objects passed around by the orchestrator
//!
//! There are several related formats we need to interact with:
//! - openai-style messages/tools, sent to OpenAI-compatible vendors
//! - anthropic messages/tools, with their content-block structure
//! - tool registry requests, sent to the business tools behind the registry
//!
//! Vendor payloads are converted at the adapter boundary; everything
//! downstream of an adapter only ever sees these internal structs.
pub mod message;
pub mod role;
pub mod tool;
