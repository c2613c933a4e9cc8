//! Admin review ranking through a language model
//!
//! The classifier is a black box returning a label. Everything around it,
//! prompt rendering and label lookup, is plain code and testable offline.

use async_trait::async_trait;
use minijinja::{context, Environment};
use serde::{Deserialize, Serialize};

use crate::catalog::models::{Ranking, UNRANKED_VALUE};
use crate::config::SentimentConfig;
use crate::error::{Error, Result};

/// Turns a prompt into a single ranking label
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, prompt: &str) -> Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: String,
}

/// Classifier backed by an OpenAI compatible chat-completions endpoint
pub struct OpenAiClassifier {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiClassifier {
    /// `None` when no api key is configured
    pub fn from_config(config: &SentimentConfig) -> Option<Self> {
        let api_key = config.api_key()?;
        Some(Self {
            client: reqwest::Client::new(),
            api_key: api_key.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl SentimentClassifier for OpenAiClassifier {
    async fn classify(&self, prompt: &str) -> Result<String> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Sentiment(format!(
                "classifier returned status {}",
                status
            )));
        }

        let reply: ChatResponse = response.json().await?;
        reply
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Sentiment("classifier returned no choices".to_string()))
    }
}

/// Render the classification prompt. The unranked sentinel is left out.
///
/// A template that never mentions `review` gets the review appended, so the
/// model always sees it.
pub fn render_prompt(template: &str, rankings: &[Ranking], review: &str) -> Result<String> {
    let names = rankings
        .iter()
        .filter(|r| r.ranking_value != UNRANKED_VALUE)
        .map(|r| r.ranking_name.as_str())
        .collect::<Vec<_>>()
        .join(",");

    let env = Environment::new();
    let tmpl = env.template_from_str(template)?;
    let mut prompt = tmpl.render(context! { rankings => names, review => review })?;

    if !tmpl.undeclared_variables(false).contains("review") {
        prompt.push_str(review);
    }

    Ok(prompt)
}

/// Look up a returned label. Unknown labels keep their text with value 0.
pub fn resolve_label(rankings: &[Ranking], label: &str) -> Ranking {
    let label = label.trim();
    let ranking_value = rankings
        .iter()
        .find(|r| r.ranking_name == label)
        .map(|r| r.ranking_value)
        .unwrap_or(0);

    Ranking {
        ranking_value,
        ranking_name: label.to_string(),
    }
}

/// Classify `review` against the known rankings
pub async fn review_ranking(
    classifier: &dyn SentimentClassifier,
    rankings: &[Ranking],
    template: &str,
    review: &str,
) -> Result<Ranking> {
    let prompt = render_prompt(template, rankings, review)?;
    let label = classifier.classify(&prompt).await?;
    let ranking = resolve_label(rankings, &label);

    if ranking.ranking_value == 0 {
        tracing::warn!(label = %ranking.ranking_name, "Classifier returned an unknown ranking");
    }

    Ok(ranking)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(&'static str);

    #[async_trait]
    impl SentimentClassifier for Fixed {
        async fn classify(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn rankings() -> Vec<Ranking> {
        vec![
            Ranking {
                ranking_value: 1,
                ranking_name: "Excellent".to_string(),
            },
            Ranking {
                ranking_value: 2,
                ranking_name: "Good".to_string(),
            },
            Ranking::unranked(),
        ]
    }

    #[test]
    fn test_prompt_skips_unranked() {
        let prompt = render_prompt("{{ rankings }}|{{ review }}", &rankings(), "Loved it").unwrap();
        assert_eq!(prompt, "Excellent,Good|Loved it");
    }

    #[test]
    fn test_review_appended_when_template_omits_it() {
        let prompt =
            render_prompt("Pick one of {{ rankings }}: ", &rankings(), "Loved it").unwrap();
        assert_eq!(prompt, "Pick one of Excellent,Good: Loved it");
    }

    #[test]
    fn test_review_not_duplicated() {
        let prompt = render_prompt("{{ review }}", &rankings(), "Loved it").unwrap();
        assert_eq!(prompt, "Loved it");
    }

    #[test]
    fn test_default_template_renders() {
        let template = SentimentConfig::default().prompt_template;
        let prompt = render_prompt(&template, &rankings(), "Dull").unwrap();
        assert!(prompt.contains("Excellent,Good"));
        assert!(prompt.ends_with("Dull"));
        assert!(!prompt.contains("Not_Ranked"));
    }

    #[test]
    fn test_resolve_unknown_label() {
        let ranking = resolve_label(&rankings(), " Meh \n");
        assert_eq!(ranking.ranking_value, 0);
        assert_eq!(ranking.ranking_name, "Meh");
    }

    #[tokio::test]
    async fn test_review_ranking_trims_label() {
        let ranking = review_ranking(&Fixed("Good\n"), &rankings(), "{{ review }}", "fine")
            .await
            .unwrap();
        assert_eq!(ranking.ranking_value, 2);
        assert_eq!(ranking.ranking_name, "Good");
    }

    #[test]
    fn test_classifier_requires_key() {
        assert!(OpenAiClassifier::from_config(&SentimentConfig::default()).is_none());
        let config = SentimentConfig {
            api_key: Some("sk-test".to_string()),
            ..SentimentConfig::default()
        };
        assert!(OpenAiClassifier::from_config(&config).is_some());
    }
}
