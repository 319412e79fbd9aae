//! Built-in tools: dad jokes, reddit posts, image generation, weather.
//!
//! Each tool is an [`AgentTool`] returned as `Arc<dyn Tool>`. Network-backed
//! tools take an optional base URL so they can be pointed at a test server.
//! The descriptions steer when the model picks a tool, so edit them with care.
//!
//! ```rust,no_run
//! use turnkit::config::AgentConfig;
//! use turnkit::tools::builtin::default_registry;
//!
//! let registry = default_registry(&AgentConfig::default()).unwrap();
//! assert_eq!(registry.len(), 4);
//! ```

use std::sync::Arc;

use reqwest::header::HeaderMap;
use serde::Deserialize;

use crate::config::AgentConfig;
use crate::error::TurnkitError;
use crate::provider::http::{bearer_headers, json_headers, shared_client, status_to_error};
use crate::provider::openai::DEFAULT_BASE_URL as OPENAI_BASE_URL;
use crate::tools::registry::ToolRegistry;
use crate::tools::tool::{AgentTool, Tool};
use crate::tools::types::ToolParameters;

pub const DAD_JOKE: &str = "dad_joke";
pub const REDDIT: &str = "reddit";
pub const GENERATE_IMAGE: &str = "generate_image";
pub const GET_WEATHER: &str = "get_weather";

const DAD_JOKE_BASE_URL: &str = "https://icanhazdadjoke.com";
const REDDIT_BASE_URL: &str = "https://www.reddit.com";
const REDDIT_FEED_PATH: &str = "/r/nba/.json";
const IMAGE_SIZE: &str = "1024x1024";

async fn get_json(
    tool_name: &str,
    url: &str,
    headers: HeaderMap,
) -> Result<serde_json::Value, TurnkitError> {
    let resp = shared_client()
        .get(url)
        .headers(headers)
        .send()
        .await
        .map_err(|e| TurnkitError::handler_from(tool_name, e))?;
    read_json(tool_name, resp).await
}

async fn read_json(
    tool_name: &str,
    resp: reqwest::Response,
) -> Result<serde_json::Value, TurnkitError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let err = status_to_error(status.as_u16(), &body);
        return Err(TurnkitError::handler_from(tool_name, err));
    }
    resp.json()
        .await
        .map_err(|e| TurnkitError::Handler {
            tool_name: tool_name.to_string(),
            message: format!("invalid response body: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Create the `dad_joke` tool: fetches one random joke as plain text.
pub fn dad_joke_tool(base_url: Option<String>) -> Arc<dyn Tool> {
    let base_url = base_url.unwrap_or_else(|| DAD_JOKE_BASE_URL.to_string());
    Arc::new(AgentTool::new(
        DAD_JOKE,
        "Fetch a random dad joke. Use this whenever the user asks for a joke, a pun, or something silly.",
        ToolParameters::empty(),
        move |_input| {
            let url = format!("{}/", base_url.trim_end_matches('/'));
            async move {
                let body = get_json(DAD_JOKE, &url, json_headers()).await?;
                let joke = body
                    .get("joke")
                    .and_then(|j| j.as_str())
                    .ok_or_else(|| TurnkitError::handler(DAD_JOKE, "response has no joke"))?;
                Ok(serde_json::Value::String(joke.to_string()))
            }
        },
    ))
}

#[derive(Deserialize)]
struct RedditListing {
    data: RedditListingData,
}

#[derive(Deserialize)]
struct RedditListingData {
    children: Vec<RedditChild>,
}

#[derive(Deserialize)]
struct RedditChild {
    data: RedditPost,
}

#[derive(Deserialize)]
struct RedditPost {
    title: String,
    url: String,
    subreddit_name_prefixed: String,
    author: String,
    #[serde(default)]
    ups: i64,
}

/// Create the `reddit` tool: latest posts from the NBA subreddit.
pub fn reddit_tool(base_url: Option<String>) -> Arc<dyn Tool> {
    let base_url = base_url.unwrap_or_else(|| REDDIT_BASE_URL.to_string());
    Arc::new(AgentTool::new(
        REDDIT,
        "Fetch the latest posts from reddit. Returns each post's title, link, subreddit, author and upvotes.",
        ToolParameters::empty(),
        move |_input| {
            let url = format!("{}{REDDIT_FEED_PATH}", base_url.trim_end_matches('/'));
            async move {
                let body = get_json(REDDIT, &url, json_headers()).await?;
                let listing: RedditListing = serde_json::from_value(body).map_err(|e| {
                    TurnkitError::Handler {
                        tool_name: REDDIT.to_string(),
                        message: format!("unexpected listing shape: {e}"),
                        source: Some(Box::new(e)),
                    }
                })?;
                let posts: Vec<serde_json::Value> = listing
                    .data
                    .children
                    .into_iter()
                    .map(|child| {
                        let post = child.data;
                        serde_json::json!({
                            "title": post.title,
                            "link": post.url,
                            "subreddit": post.subreddit_name_prefixed,
                            "author": post.author,
                            "upvotes": post.ups,
                        })
                    })
                    .collect();
                Ok(serde_json::Value::Array(posts))
            }
        },
    ))
}

#[derive(Deserialize)]
struct ImageArgs {
    prompt: String,
}

/// Create the `generate_image` tool: renders a prompt with the OpenAI Images
/// API and returns the image URL.
///
/// A missing API key is only reported when the tool runs, so the tool can be
/// registered (and advertised) without credentials.
pub fn generate_image_tool(
    api_key: Option<String>,
    base_url: Option<String>,
    model: impl Into<String>,
) -> Arc<dyn Tool> {
    let base_url = base_url.unwrap_or_else(|| OPENAI_BASE_URL.to_string());
    let model = model.into();
    Arc::new(AgentTool::new(
        GENERATE_IMAGE,
        "Generate an image and return its URL. Taking a photo counts as generating an image.",
        ToolParameters::object()
            .string(
                "prompt",
                "Prompt for the image. Build it from the user's original message; \
                 if the request is too vague, ask the user for more details instead.",
                true,
            )
            .build(),
        move |input| {
            let url = format!("{}/images/generations", base_url.trim_end_matches('/'));
            let api_key = api_key.clone();
            let model = model.clone();
            async move {
                let api_key = api_key
                    .ok_or_else(|| TurnkitError::Authentication("Missing OPENAI_API_KEY".into()))?;
                let args: ImageArgs = input.tool_args.deserialize()?;
                let resp = shared_client()
                    .post(&url)
                    .headers(bearer_headers(&api_key))
                    .json(&serde_json::json!({
                        "model": model,
                        "prompt": args.prompt,
                        "n": 1,
                        "size": IMAGE_SIZE,
                    }))
                    .send()
                    .await
                    .map_err(|e| TurnkitError::handler_from(GENERATE_IMAGE, e))?;
                let body = read_json(GENERATE_IMAGE, resp).await?;
                let image_url = body["data"][0]["url"]
                    .as_str()
                    .ok_or_else(|| TurnkitError::handler(GENERATE_IMAGE, "response has no image url"))?;
                Ok(serde_json::Value::String(image_url.to_string()))
            }
        },
    ))
}

/// Create the `get_weather` tool. Canned report, no network.
pub fn weather_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        GET_WEATHER,
        "Get the current weather. Use this when the user asks about the weather or temperature.",
        ToolParameters::object()
            .string("location", "Place the user asked about, if any", false)
            .build(),
        |_input| async { Ok(serde_json::json!("very cold. 17deg")) },
    ))
}

/// Every built-in tool, configured from `config`.
pub fn all_tools(config: &AgentConfig) -> Vec<Arc<dyn Tool>> {
    vec![
        dad_joke_tool(config.dad_joke_base_url.clone()),
        reddit_tool(config.reddit_base_url.clone()),
        generate_image_tool(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.image_model.clone(),
        ),
        weather_tool(),
    ]
}

/// Registry holding every built-in tool.
pub fn default_registry(config: &AgentConfig) -> Result<ToolRegistry, TurnkitError> {
    ToolRegistry::from_tools(all_tools(config))
}
