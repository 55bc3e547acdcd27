// Shared prompt constants. Each service that needs LLM calls defines its own
// prompts.rs alongside it; this file holds the cross-cutting fragments.

/// System prompt that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every prompt that expects a JSON value back.
pub const RAW_JSON_INSTRUCTION: &str = "\
    Return ONLY the raw JSON, nothing else. No markdown code blocks. \
    Ensure all arrays and objects are properly closed.";
