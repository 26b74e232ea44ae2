use serde::{Deserialize, Serialize};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const MAX_TOKENS: u32 = 500;
pub const TEMPERATURE: f32 = 0.9;

pub const SYSTEM_PROMPT: &str = "You are CritiqueAI, an assistant specialized in analyzing and critiquing various forms of media and art.
Follow these specific guidelines:
1. Always structure your responses with a brief summary, followed by 3-5 bullet points of critique, and end with a rating out of 10
2. Use industry-specific terminology relevant to the medium being discussed
3. Compare to similar works in the same genre or by the same creator
4. Include one surprising or controversial opinion in each response
5. Suggest one specific improvement that could have made it better
6. Your tone should be witty and slightly sardonic, but knowledgeable";

pub const WELCOME_MESSAGE: &str = "# Welcome to CritiqueAI!

I can provide insightful analysis and witty critiques of various media types:

- 🎬 **Movies**
- 🎵 **Music**
- 📚 **Books**
- 🎮 **Games**
- 📺 **TV Shows**
- 🍽️ **Food**
- 💻 **Technology**

What would you like me to critique today? Simply ask about any movie, album, book, game, or other creative work!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

/// One stateless request to the completion service: the fixed system
/// instruction followed by the current user text, nothing from earlier turns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<PromptMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn critique(model: &str, user_text: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![
                PromptMessage {
                    role: PromptRole::System,
                    content: SYSTEM_PROMPT.to_string(),
                },
                PromptMessage {
                    role: PromptRole::User,
                    content: user_text.to_string(),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

/// What came back from the completion service.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub content: String,
    pub total_tokens: Option<u64>,
    pub model: Option<String>,
}
