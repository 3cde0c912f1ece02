//! Built-in workflow templates

use super::builder::{ConnectionSpec, NodeSpec, build_workflow};
use crate::error::{Error, Result};
use crate::workflow::WorkflowDefinition;
use clap::ValueEnum;
use serde_json::json;

/// Ready-made workflow shapes for `n8nwm new`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TemplateKind {
    /// Webhook trigger answered by a fixed JSON response
    Webhook,
    /// Webhook forwarded to OpenAI, answered with the completion
    AiChat,
    /// Upcoming Google Calendar events filtered and mailed out
    Calendar,
    /// Telegram bot backed by an AI agent with Gmail and Calendar tools
    TelegramAssistant,
}

impl TemplateKind {
    pub fn all() -> &'static [TemplateKind] {
        Self::value_variants()
    }

    /// Name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            Self::Webhook => "webhook",
            Self::AiChat => "ai-chat",
            Self::Calendar => "calendar",
            Self::TelegramAssistant => "telegram-assistant",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Webhook => "Webhook trigger answered by a fixed JSON response",
            Self::AiChat => "Webhook forwarded to OpenAI, answered with the completion",
            Self::Calendar => "Upcoming Google Calendar events filtered and mailed out",
            Self::TelegramAssistant => "Telegram bot backed by an AI agent with Gmail and Calendar tools",
        }
    }

    /// Webhook path used when none is given; `None` for templates without a webhook
    pub fn default_path(&self) -> Option<&'static str> {
        match self {
            Self::Webhook => Some("webhook"),
            Self::AiChat => Some("chat"),
            Self::Calendar | Self::TelegramAssistant => None,
        }
    }

    /// Build a new workflow from this template
    ///
    /// `webhook_path` overrides [`TemplateKind::default_path`] and is ignored by
    /// templates without a webhook trigger.
    pub fn build(&self, name: &str, webhook_path: Option<&str>) -> Result<WorkflowDefinition> {
        let path = webhook_path.or(self.default_path()).unwrap_or_default();
        match self {
            Self::Webhook => webhook(name, path),
            Self::AiChat => ai_chat(name, path),
            Self::Calendar => calendar(name),
            Self::TelegramAssistant => telegram_assistant(name),
        }
    }
}

impl std::fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for TemplateKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| {
                let known: Vec<_> = Self::all().iter().map(TemplateKind::name).collect();
                Error::InvalidTemplate(format!(
                    "unknown template '{}', expected one of: {}",
                    s,
                    known.join(", ")
                ))
            })
    }
}

fn webhook_trigger(name: &str, path: &str) -> NodeSpec {
    NodeSpec::new(name, "n8n-nodes-base.webhook").parameters(json!({
        "httpMethod": "POST",
        "path": path,
        "responseMode": "responseNode",
        "options": {}
    }))
}

fn webhook(name: &str, path: &str) -> Result<WorkflowDefinition> {
    build_workflow(
        name,
        vec![
            webhook_trigger("Webhook Trigger", path),
            NodeSpec::new("Respond to Webhook", "n8n-nodes-base.respondToWebhook").parameters(
                json!({
                    "respondWith": "json",
                    "responseBody": "{\"message\": \"Hello from n8n!\"}",
                    "options": {}
                }),
            ),
        ],
        vec![ConnectionSpec::new("Webhook Trigger", "Respond to Webhook")],
    )
}

fn ai_chat(name: &str, path: &str) -> Result<WorkflowDefinition> {
    build_workflow(
        name,
        vec![
            webhook_trigger("Chat Webhook", path),
            NodeSpec::new("OpenAI", "n8n-nodes-base.openAi").parameters(json!({
                "authentication": "apiKey",
                "operation": "chatCompletion",
                "model": "gpt-3.5-turbo",
                "messages": "={{ $json.messages }}",
                "options": {}
            })),
            NodeSpec::new("AI Response", "n8n-nodes-base.respondToWebhook").parameters(json!({
                "respondWith": "json",
                "responseBody": "={{ $json }}",
                "options": {}
            })),
        ],
        vec![
            ConnectionSpec::new("Chat Webhook", "OpenAI"),
            ConnectionSpec::new("OpenAI", "AI Response"),
        ],
    )
}

fn calendar(name: &str) -> Result<WorkflowDefinition> {
    build_workflow(
        name,
        vec![
            NodeSpec::new("Get Calendar Events", "n8n-nodes-base.googleCalendar")
                .type_version(2.0)
                .parameters(json!({
                    "operation": "getAll",
                    "calendar": "primary",
                    "options": {}
                })),
            NodeSpec::new("Check if Event Soon", "n8n-nodes-base.if")
                .type_version(2.0)
                .parameters(json!({
                    "conditions": {
                        "options": {
                            "caseSensitive": true,
                            "leftValue": "",
                            "typeValidation": "strict"
                        },
                        "conditions": [{
                            "id": "condition-1",
                            "leftValue": "={{ $json.start.dateTime }}",
                            "rightValue": "={{ new Date(Date.now() + 24*60*60*1000) }}",
                            "operator": {"type": "date", "operation": "before"}
                        }],
                        "combinator": "and"
                    },
                    "options": {}
                })),
            NodeSpec::new("Send Notification", "n8n-nodes-base.emailSend")
                .type_version(2.0)
                .parameters(json!({
                    "fromEmail": "noreply@example.com",
                    "toEmail": "user@example.com",
                    "subject": "Upcoming Calendar Event",
                    "text": "You have an upcoming event tomorrow!",
                    "options": {}
                })),
        ],
        vec![
            ConnectionSpec::new("Get Calendar Events", "Check if Event Soon"),
            ConnectionSpec::new("Check if Event Soon", "Send Notification"),
        ],
    )
}

fn telegram_assistant(name: &str) -> Result<WorkflowDefinition> {
    let mut workflow = build_workflow(
        name,
        vec![
            NodeSpec::new("Telegram Trigger", "n8n-nodes-base.telegramTrigger")
                .type_version(1.2)
                .position(576, 32)
                .parameters(json!({"updates": ["message"], "additionalFields": {}})),
            NodeSpec::new("AI Agent", "@n8n/n8n-nodes-langchain.agent")
                .type_version(2.2)
                .position(816, 32)
                .with_field("alwaysOutputData", json!(true))
                .parameters(json!({
                    "promptType": "define",
                    "text": "=# User message\n{{ $json.message.text }}",
                    "options": {
                        "systemMessage": "You are an assistant with access to Google Calendar and Gmail tools.\nUse today's date as reference: {{ $now }}.\n"
                    }
                })),
            NodeSpec::new("Send Telegram Message", "n8n-nodes-base.telegram")
                .type_version(1.2)
                .position(1152, 32)
                .parameters(json!({
                    "chatId": "={{ $('Telegram Trigger').item.json.message.chat.id }}",
                    "text": "={{ $json.output }}",
                    "additionalFields": {"appendAttribution": false}
                })),
            NodeSpec::new("OpenAI Model", "@n8n/n8n-nodes-langchain.lmChatOpenAi")
                .position(672, 240)
                .parameters(json!({"model": "gpt-4", "options": {}})),
            NodeSpec::new("Conversation Memory", "@n8n/n8n-nodes-langchain.memoryBufferWindow")
                .type_version(1.3)
                .position(816, 240)
                .parameters(json!({
                    "sessionIdType": "customKey",
                    "sessionKey": "={{ $('Telegram Trigger').item.json.message.chat.id }}"
                })),
            NodeSpec::new("Get Calendar Events", "n8n-nodes-base.googleCalendarTool")
                .type_version(1.3)
                .position(992, 256)
                .parameters(json!({
                    "operation": "getAll",
                    "calendar": "primary",
                    "timeMin": "={{ $fromAI('After', ``, 'string') }}",
                    "timeMax": "={{ $fromAI('Before', ``, 'string') }}",
                    "options": {}
                })),
            NodeSpec::new("Get Gmail Messages", "n8n-nodes-base.gmailTool")
                .type_version(2.1)
                .position(1152, 240)
                .parameters(json!({
                    "operation": "getAll",
                    "returnAll": true,
                    "filters": {"q": "=from:{{ $fromAI('email') }}"},
                    "options": {}
                })),
        ],
        vec![
            ConnectionSpec::new("Telegram Trigger", "AI Agent"),
            ConnectionSpec::new("AI Agent", "Send Telegram Message"),
            ConnectionSpec::new("OpenAI Model", "AI Agent").kind("ai_languageModel"),
            ConnectionSpec::new("Conversation Memory", "AI Agent").kind("ai_memory"),
            ConnectionSpec::new("Get Calendar Events", "AI Agent").kind("ai_tool"),
            ConnectionSpec::new("Get Gmail Messages", "AI Agent").kind("ai_tool"),
        ],
    )?;

    workflow
        .extra
        .insert("settings".to_string(), json!({"executionOrder": "v1"}));
    Ok(workflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::document;

    #[test]
    fn test_every_template_builds_and_validates() {
        for kind in TemplateKind::all() {
            let workflow = kind.build("Generated", None).unwrap();
            assert_eq!(workflow.name, "Generated");
            assert!(!workflow.active);
            assert!(workflow.id.is_none());
            assert!(!workflow.nodes.is_empty(), "{}", kind);
            workflow.validate().unwrap();

            let raw = document::serialize(&workflow);
            assert_eq!(document::parse(&raw).unwrap(), workflow, "{}", kind);
        }
    }

    #[test]
    fn test_webhook_path() {
        let workflow = TemplateKind::Webhook.build("Hook", Some("orders")).unwrap();
        assert_eq!(workflow.nodes[0].parameters["path"], json!("orders"));

        let workflow = TemplateKind::AiChat.build("Chat", None).unwrap();
        assert_eq!(workflow.node("Chat Webhook").unwrap().parameters["path"], json!("chat"));
    }

    #[test]
    fn test_telegram_assistant_wiring() {
        let workflow = TemplateKind::TelegramAssistant.build("Assistant", None).unwrap();
        assert_eq!(workflow.nodes.len(), 7);
        assert_eq!(workflow.extra["settings"]["executionOrder"], json!("v1"));

        let into_agent = workflow
            .edges()
            .filter(|(_, target)| target.node == "AI Agent")
            .count();
        assert_eq!(into_agent, 5);
        assert_eq!(
            workflow.connections["Get Gmail Messages"]["ai_tool"][0][0].kind,
            "ai_tool"
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!("ai-chat".parse::<TemplateKind>().unwrap(), TemplateKind::AiChat);
        assert_eq!(
            " Telegram-Assistant ".parse::<TemplateKind>().unwrap(),
            TemplateKind::TelegramAssistant
        );
        assert!(matches!(
            "slack".parse::<TemplateKind>(),
            Err(Error::InvalidTemplate(_))
        ));
    }

    #[test]
    fn test_names_match_clap_values() {
        for kind in TemplateKind::all() {
            let value = kind.to_possible_value().unwrap();
            assert_eq!(value.get_name(), kind.name());
        }
    }
}
