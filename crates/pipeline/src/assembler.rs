//! Prompt assembly — template plus rendered knowledge.
//!
//! The assembled text becomes the system prompt for either provider. It is
//! deliberately NOT where conversation history lives: the OpenAI path
//! carries history as role-tagged messages and the Anthropic path sends this
//! text as the top-level `system` field. That divergence belongs to the
//! dispatcher boundary.

use notus_core::{AgentConfig, KnowledgeRecord};

const KNOWLEDGE_HEADING: &str = "KNOWLEDGE BASE:";

const CLOSING_INSTRUCTION: &str = "Use the knowledge base above to inform your responses. \
When tone-of-voice or brand guidance is present, preserve it in everything you write.";

/// Build the system prompt for one invocation.
///
/// Starts from the agent's template verbatim. Knowledge, when present, is
/// appended under a labeled heading followed by a closing instruction; an
/// empty knowledge set leaves the template untouched — no empty heading, no
/// trailing section.
pub fn build_prompt(config: &AgentConfig, knowledge: &[KnowledgeRecord]) -> String {
    let mut prompt = config.prompt_template.clone();

    if knowledge.is_empty() {
        return prompt;
    }

    prompt.push_str("\n\n");
    prompt.push_str(KNOWLEDGE_HEADING);
    for record in knowledge {
        prompt.push('\n');
        prompt.push_str(&render_record(record));
    }
    prompt.push_str("\n\n");
    prompt.push_str(CLOSING_INSTRUCTION);
    prompt
}

/// Render one record through the ordered shape rules.
///
/// The three source tables have incompatible schemas, so rendering is
/// field-driven: every rule whose fields are present contributes a line. A
/// record matching no rule degrades to its raw JSON dump rather than
/// failing the invocation.
fn render_record(record: &KnowledgeRecord) -> String {
    let mut lines = Vec::new();

    if let (Some(title), Some(content)) = (&record.title, &record.content) {
        lines.push(format!("{title}: {content}"));
    } else if let Some(content) = &record.content {
        lines.push(content.clone());
    }

    if let Some(name) = &record.name {
        match &record.description {
            Some(description) => lines.push(format!("Brand: {name} - {description}")),
            None => lines.push(format!("Brand: {name}")),
        }
    }

    if let Some(tone) = &record.tone_of_voice {
        lines.push(format!("Tone of voice: {tone}"));
    }

    if let Some(bio) = &record.bio {
        lines.push(format!("Bio: {bio}"));
    }

    if !record.expertise.is_empty() {
        lines.push(format!("Expertise: {}", record.expertise.join(", ")));
    }

    if lines.is_empty() {
        return serde_json::to_string(record).unwrap_or_default();
    }

    lines.join("\n")
}
