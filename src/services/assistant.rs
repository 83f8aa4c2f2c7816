use crate::{
    error::{ApiError, Result},
    ml::{GenerationRequest, TextGenerator},
    models::{ChatReply, ChatTurn, Suggestion, UserProfile},
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;
use tracing::{info, warn};

const PERSONA: &str = "\
You are EcoGenie, a friendly and helpful AI assistant passionate about sustainability.
Your purpose is to provide information, tips, and resources to help users live more eco-consciously.";

const CHAT_INSTRUCTION: &str = "
You should personalize your suggestions based on the user's profile provided below.

user_profile: {user_profile}

If you learn something new about the user that belongs in their profile, write an updated profile text.
To do this, start your response with {new_profile: \"updated profile text\"}, then a newline, then the rest of your response.

If a user asks a question unrelated to sustainability, politely explain that you focus on helping people live more sustainably and cannot answer it.";

const PROFILE_INSTRUCTION: &str = "
You will be given a user's answers to an onboarding survey.
Respond with just a short and concise profile summary that captures the user's key characteristics, lifestyle and sustainability habits.
Do not add anything else to the response.";

const SUGGESTIONS_INSTRUCTION: &str = "
You should personalize your suggestions based on the user's profile provided below.

user_profile: {user_profile}";

const SUGGESTIONS_PROMPT: &str = "\
As part of onboarding, give the user a list of practical, actionable sustainability suggestions they can later pick from for a deeper explanation.
Wrap each suggestion in a <suggestion> tag. Each suggestion has a bold title followed by a short description, for example:
<suggestion>
**Compost Food Scraps:** Start a compost bin to turn food scraps and yard waste into nutrient-rich soil for your garden.
</suggestion>";

const SUMMARY_INSTRUCTION: &str = "\
You will be given a JSON array containing a conversation between a user and a model, with roles \"user\" and \"model\".
Summarize the conversation, keeping each role and only the most important information from each message.
If many messages near the top are already summarized, merge them into a single message from the model that starts with \"Conversation summary: \".
If a conversation summary is already present, update it with the newly summarized messages, shortening older information if needed.
Return a JSON array of objects with the fields \"role\" and \"parts\".";

static PROFILE_UPDATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)^\s*\{\s*"?new_profile"?\s*:\s*"(.*?)"\s*\}[ \t]*\r?\n?(.*)$"#)
        .expect("profile update pattern is valid")
});

static SUGGESTION_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<(?:suggestion|suggetion)>(.*?)</(?:suggestion|suggetion)>")
        .expect("suggestion tag pattern is valid")
});

static BOLD_TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^\*\*(.+?)\*\*\s*:?\s*(.*)$").expect("bold title pattern is valid")
});

/// Split a leading `{new_profile: "..."}` marker off an assistant reply.
pub fn parse_profile_update(reply: &str) -> ChatReply {
    match PROFILE_UPDATE.captures(reply) {
        Some(caps) => {
            let profile = caps[1].trim();
            ChatReply {
                response: caps[2].trim().to_string(),
                new_profile: (!profile.is_empty()).then(|| profile.to_string()),
            }
        }
        None => ChatReply {
            response: reply.trim().to_string(),
            new_profile: None,
        },
    }
}

/// Extract every tagged suggestion from generated text.
pub fn parse_suggestions(text: &str) -> Vec<Suggestion> {
    SUGGESTION_TAG
        .captures_iter(text)
        .filter_map(|caps| {
            let body = caps[1].trim();
            if body.is_empty() {
                return None;
            }
            Some(match BOLD_TITLE.captures(body) {
                Some(parts) => Suggestion {
                    title: parts[1].trim().trim_end_matches(':').trim().to_string(),
                    description: parts[2].trim().to_string(),
                },
                None => Suggestion {
                    title: body.to_string(),
                    description: String::new(),
                },
            })
        })
        .collect()
}

/// Conversational features of EcoGenie built on the text generator.
#[derive(Clone)]
pub struct AssistantService {
    generator: Arc<dyn TextGenerator>,
    chat_model: String,
    profile_model: String,
}

fn require_history(history: &[ChatTurn]) -> Result<()> {
    if history.is_empty() {
        return Err(ApiError::InvalidInput(
            "chat_history must be a non-empty list.".to_string(),
        ));
    }
    Ok(())
}

impl AssistantService {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        chat_model: impl Into<String>,
        profile_model: impl Into<String>,
    ) -> Self {
        Self {
            generator,
            chat_model: chat_model.into(),
            profile_model: profile_model.into(),
        }
    }

    /// Continue a conversation, separating out any profile update the model proposes.
    pub async fn chat(&self, history: &[ChatTurn], profile: &UserProfile) -> Result<ChatReply> {
        require_history(history)?;
        let profile_text = profile.effective_text()?;

        let request = GenerationRequest::new(self.chat_model.clone(), history.to_vec())
            .with_system_instruction(format!(
                "{}\n{}",
                PERSONA,
                CHAT_INSTRUCTION.replace("{user_profile}", &profile_text)
            ));
        let reply = parse_profile_update(&self.generator.generate(request).await?);

        if reply.new_profile.is_some() {
            info!("Assistant proposed a profile update");
        }
        Ok(reply)
    }

    /// Write a concise profile summary from survey answers.
    pub async fn summarize_profile(&self, profile: &UserProfile) -> Result<String> {
        let fields = profile.fields();
        if fields.is_empty() {
            return Err(ApiError::InvalidInput(
                "profile must contain survey answers".to_string(),
            ));
        }
        let answers = fields
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("\n");

        let request =
            GenerationRequest::new(self.profile_model.clone(), vec![ChatTurn::user(answers)])
                .with_system_instruction(format!("{}\n{}", PERSONA, PROFILE_INSTRUCTION));

        Ok(self.generator.generate(request).await?.trim().to_string())
    }

    /// Onboarding suggestions tailored to the profile.
    pub async fn suggestions(&self, profile: &UserProfile) -> Result<Vec<Suggestion>> {
        let profile_text = profile.effective_text()?;
        let request = GenerationRequest::new(
            self.chat_model.clone(),
            vec![ChatTurn::user(SUGGESTIONS_PROMPT)],
        )
        .with_system_instruction(format!(
            "{}\n{}",
            PERSONA,
            SUGGESTIONS_INSTRUCTION.replace("{user_profile}", &profile_text)
        ));

        let text = self.generator.generate(request).await?;
        let suggestions = parse_suggestions(&text);
        if suggestions.is_empty() {
            warn!("Suggestion reply contained no tagged suggestions");
            return Err(ApiError::UpstreamService(
                "text generator returned no suggestions".to_string(),
            ));
        }
        Ok(suggestions)
    }

    /// Compress a conversation into fewer turns, keeping roles.
    pub async fn summarize_chat(&self, history: &[ChatTurn]) -> Result<Vec<ChatTurn>> {
        require_history(history)?;
        let request = GenerationRequest::new(
            self.chat_model.clone(),
            vec![ChatTurn::user(serde_json::to_string(history)?)],
        )
        .with_system_instruction(SUMMARY_INSTRUCTION)
        .expect_json();

        let text = self.generator.generate(request).await?;
        let summary: Vec<ChatTurn> = serde_json::from_str(text.trim()).map_err(|e| {
            ApiError::UpstreamService(format!("chat summary was not valid JSON: {}", e))
        })?;

        if summary.is_empty() {
            return Err(ApiError::UpstreamService(
                "chat summary was empty".to_string(),
            ));
        }
        Ok(summary)
    }
}
