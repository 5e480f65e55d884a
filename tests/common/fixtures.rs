//! Canned endpoint responses

use serde_json::{Value, json};

/// Chat-completions style success body
pub fn chat_response(answer: &str, total_tokens: i64) -> Value {
    json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": answer },
            "finish_reason": "stop"
        }],
        "usage": { "total_tokens": total_tokens }
    })
}

/// Chat body whose message carries tool calls
pub fn chat_response_with_tools(answer: &str, total_tokens: i64) -> Value {
    json!({
        "choices": [{
            "message": {
                "role": "assistant",
                "content": answer,
                "tool_calls": [{ "type": "google_search", "query": "weather" }]
            },
            "finish_reason": "stop"
        }],
        "usage": { "total_tokens": total_tokens }
    })
}

/// Chat body with a blank answer
pub fn empty_answer_response(finish_reason: &str) -> Value {
    json!({
        "choices": [{
            "message": { "role": "assistant", "content": "" },
            "finish_reason": finish_reason
        }],
        "usage": { "total_tokens": 9 }
    })
}

/// Private gateway success body
pub fn gateway_response(answer: &str, total_tokens: i64) -> Value {
    json!({
        "code": 0,
        "answer": [{ "type": "text", "value": answer }],
        "cost_info": { "total_tokens": total_tokens }
    })
}
