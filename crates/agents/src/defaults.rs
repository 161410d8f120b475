//! Compiled-in default configurations, one per built-in role.
//!
//! These are the immutable baseline; a tenant override (same shape, stored
//! as JSON text) supersedes a default wholesale at resolution time.

use notus_core::{AgentConfig, AgentRole, Provider};

/// The role every unrecognized name resolves to.
pub const FALLBACK_ROLE: &str = "client_consultant";

/// All built-in role names, in presentation order.
pub const BUILTIN_ROLES: &[&str] = &[
    "content_strategist",
    "copywriter",
    "client_consultant",
    "tone_analyst",
];

const CONTENT_STRATEGIST_PROMPT: &str = "\
You are a senior content strategist for a personal-brand agency. You help \
clients plan what to publish: topics, angles, cadence, and platform fit. \
Ground every recommendation in the client's positioning and audience. Be \
specific — name the topic, the format, and the reason it will land.";

const COPYWRITER_PROMPT: &str = "\
You are an expert social media copywriter. You turn ideas, transcripts, and \
rough notes into polished posts. Write tight hooks, short paragraphs, and \
concrete language. Match the client's established voice exactly; never drift \
into generic marketing speak.";

const CLIENT_CONSULTANT_PROMPT: &str = "\
You are a personal-brand consultant. You answer questions about the client's \
content program: strategy, positioning, audience growth, and what to do \
next. Be direct and practical, and defer to any brand guidance you have \
been given.";

const TONE_ANALYST_PROMPT: &str = "\
You are a brand voice analyst. Given a sample of someone's published \
writing, you describe how they sound: tone, style, recurring patterns, and \
themes. You respond only with the exact JSON object requested — no prose, \
no markdown.";

/// The default configuration for `role`.
///
/// Unknown roles get the `client_consultant` default — a deliberate
/// lenient-default policy, not an error path.
pub fn default_for(role: &AgentRole) -> AgentConfig {
    match role.as_str() {
        "content_strategist" => AgentConfig {
            role: AgentRole::from("content_strategist"),
            provider: Provider::OpenAi,
            model: "gpt-4o".into(),
            prompt_template: CONTENT_STRATEGIST_PROMPT.into(),
            temperature: 0.7,
            max_tokens: 2000,
        },
        "copywriter" => AgentConfig {
            role: AgentRole::from("copywriter"),
            provider: Provider::OpenAi,
            model: "gpt-4o".into(),
            prompt_template: COPYWRITER_PROMPT.into(),
            temperature: 0.8,
            max_tokens: 2000,
        },
        "tone_analyst" => AgentConfig {
            role: AgentRole::from("tone_analyst"),
            provider: Provider::Anthropic,
            model: "claude-sonnet-4-20250514".into(),
            prompt_template: TONE_ANALYST_PROMPT.into(),
            temperature: 0.3,
            max_tokens: 1500,
        },
        _ => AgentConfig {
            role: AgentRole::from(FALLBACK_ROLE),
            provider: Provider::OpenAi,
            model: "gpt-4o-mini".into(),
            prompt_template: CLIENT_CONSULTANT_PROMPT.into(),
            temperature: 0.7,
            max_tokens: 2000,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_role_resolves_to_itself() {
        for name in BUILTIN_ROLES {
            let config = default_for(&AgentRole::from(name));
            if *name == FALLBACK_ROLE {
                assert_eq!(config.role.as_str(), FALLBACK_ROLE);
            } else {
                assert_eq!(config.role.as_str(), *name);
            }
        }
    }

    #[test]
    fn unknown_role_gets_fallback() {
        let config = default_for(&AgentRole::from("growth_hacker"));
        assert_eq!(config.role.as_str(), FALLBACK_ROLE);
    }

    #[test]
    fn temperatures_in_range() {
        for name in BUILTIN_ROLES {
            let config = default_for(&AgentRole::from(name));
            assert!((0.0..=1.0).contains(&config.temperature), "{name}");
        }
    }
}
