//! Model identifiers known to the default price and model tables

/// Claude Opus 4.5 (highest capability tier)
pub const CLAUDE_OPUS_45: &str = "claude-opus-4-5-20251101";
/// Claude Opus 4.6
pub const CLAUDE_OPUS_46: &str = "claude-opus-4-6";
/// Claude Sonnet 4.5 (mid tier)
pub const CLAUDE_SONNET_45: &str = "claude-sonnet-4-5-20250929";
/// Claude Haiku 4.5
pub const CLAUDE_HAIKU_45: &str = "claude-haiku-4-5-20251001";
/// Gemini 2.5 Pro (balanced default)
pub const GEMINI_PRO: &str = "gemini-2.5-pro";
/// Gemini 2.5 Flash (fast and cheap)
pub const GEMINI_FLASH: &str = "gemini-2.5-flash";
/// Local Llama 3.1 served by Ollama (zero-cost fallback)
pub const OLLAMA_LLAMA: &str = "ollama/llama3.1";
