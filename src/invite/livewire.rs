//! Invitation via the team page's Livewire component.
//!
//! Two requests on one cookie session: fetch `/team/members` for the CSRF
//! token, then post a `team.invite-link` component update to
//! `/livewire/update`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ORIGIN, REFERER};
use serde_json::json;
use uuid::Uuid;

use crate::config::InviteConfig;
use crate::invite::{is_plausible_email, InviteError, InviteGateway};
use crate::observability::metrics;

const MEMBERS_PATH: &str = "/team/members";
const UPDATE_PATH: &str = "/livewire/update";

pub struct LivewireInviteGateway {
    base_url: String,
    timeout: Duration,
}

impl LivewireInviteGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &InviteConfig) -> Result<Self, url::ParseError> {
        url::Url::parse(&config.base_url)?;
        Ok(Self::new(
            &config.base_url,
            Duration::from_secs(config.request_timeout_secs),
        ))
    }

    /// A fresh client per invitation so cookies never leak between sessions.
    fn session(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .cookie_store(true)
            .timeout(self.timeout)
            .build()
    }

    async fn invite(&self, email: &str) -> Result<(), InviteError> {
        if !is_plausible_email(email) {
            return Err(InviteError::InvalidEmail);
        }

        let client = self.session()?;
        let members_url = format!("{}{}", self.base_url, MEMBERS_PATH);

        let page = client.get(&members_url).send().await?;
        if !page.status().is_success() {
            return Err(InviteError::TokenFetch(page.status().as_u16()));
        }
        let html = page.text().await?;
        let token = extract_csrf_token(&html).ok_or(InviteError::TokenMissing)?;

        let response = client
            .post(format!("{}{}", self.base_url, UPDATE_PATH))
            .header(ACCEPT, "*/*")
            .header(ORIGIN, &self.base_url)
            .header(REFERER, &members_url)
            .header("x-csrf-token", &token)
            .header("x-livewire", "")
            .json(&invite_payload(&token, email))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(InviteError::Rejected {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[async_trait]
impl InviteGateway for LivewireInviteGateway {
    async fn submit(&self, email: &str) -> Result<(), InviteError> {
        let outcome = self.invite(email).await;
        metrics::record_invite(outcome.is_ok());
        match &outcome {
            Ok(()) => tracing::info!("Invitation submitted"),
            Err(e) => tracing::error!(error = %e, "Invitation failed"),
        }
        outcome
    }
}

/// Component update that triggers the invite-link action for `email`.
fn invite_payload(token: &str, email: &str) -> serde_json::Value {
    let component_id: String = Uuid::new_v4().simple().to_string().chars().take(16).collect();
    let checksum = Uuid::new_v4().simple().to_string();

    let snapshot = json!({
        "data": { "email": "", "role": "member" },
        "memo": {
            "id": component_id,
            "name": "team.invite-link",
            "path": "team/members",
            "method": "GET",
            "children": [],
            "scripts": [],
            "assets": [],
            "errors": [],
            "locale": "en"
        },
        "checksum": checksum
    });

    json!({
        "_token": token,
        "components": [{
            "snapshot": snapshot.to_string(),
            "updates": { "email": email },
            "calls": [{ "path": "", "method": "viaLink", "params": [] }]
        }]
    })
}

/// Content of `<meta name="csrf-token" content="...">`.
pub fn extract_csrf_token(html: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lowered = html.to_ascii_lowercase();
    let mut from = 0;
    while let Some(found) = lowered[from..].find("<meta") {
        let start = from + found + "<meta".len();
        let end = start + html[start..].find('>')?;
        let attributes = parse_attributes(&html[start..end]);

        let is_token = attributes
            .iter()
            .any(|(name, value)| name == "name" && value.eq_ignore_ascii_case("csrf-token"));
        if is_token {
            return attributes
                .into_iter()
                .find(|(name, _)| name == "content")
                .map(|(_, value)| value)
                .filter(|token| !token.is_empty());
        }
        from = end;
    }
    None
}

/// Attributes of one tag body as lowercased names and raw values.
fn parse_attributes(tag: &str) -> Vec<(String, String)> {
    let mut attributes = Vec::new();
    let mut chars = tag.char_indices().peekable();

    loop {
        while chars.next_if(|(_, c)| c.is_whitespace() || *c == '/').is_some() {}
        let Some(&(name_start, _)) = chars.peek() else {
            break;
        };
        let mut name_end = tag.len();
        while let Some(&(i, c)) = chars.peek() {
            if c.is_whitespace() || c == '=' || c == '/' {
                name_end = i;
                break;
            }
            chars.next();
        }
        let name = tag[name_start..name_end].to_ascii_lowercase();

        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
        if chars.next_if(|(_, c)| *c == '=').is_none() {
            attributes.push((name, String::new()));
            continue;
        }
        while chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}

        let value = match chars.peek().copied() {
            Some((i, quote)) if quote == '"' || quote == '\'' => {
                chars.next();
                let rest = &tag[i + 1..];
                let close = rest.find(quote).unwrap_or(rest.len());
                while chars.next_if(|(j, _)| *j <= i + close).is_some() {}
                chars.next();
                rest[..close].to_string()
            }
            Some((i, _)) => {
                let mut end = tag.len();
                while let Some(&(j, c)) = chars.peek() {
                    if c.is_whitespace() {
                        end = j;
                        break;
                    }
                    chars.next();
                }
                tag[i..end].to_string()
            }
            None => String::new(),
        };
        attributes.push((name, value));
    }
    attributes
}
