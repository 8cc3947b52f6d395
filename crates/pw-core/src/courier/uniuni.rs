//! UniUni tracking backend
//!
//! UniUni's portal is a Nuxt app that embeds the full tracking state as a
//! `window.__NUXT__` assignment in the page HTML. The backend fetches the
//! tracking page and reads `state.track.items[0]` out of that payload.

use super::{CourierBackend, LookupError, Observation, UNIUNI};
use regex::Regex;
use std::sync::OnceLock;

const PORTAL_URL: &str = "https://portal.uniuni.com/track";

fn nuxt_payload_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"window\.__NUXT__=(\{.*\});").expect("static regex"))
}

/// Backend scraping the UniUni tracking portal
pub struct UniUniBackend {
    client: reqwest::blocking::Client,
}

impl UniUniBackend {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl CourierBackend for UniUniBackend {
    fn resolve(&self, number: &str) -> Result<Observation, LookupError> {
        let url = format!("{PORTAL_URL}/{number}");
        let html = self
            .client
            .get(&url)
            .send()
            .and_then(|response| response.text())
            .map_err(|e| LookupError::Http {
                courier: UNIUNI,
                number: number.to_string(),
                source: e,
            })?;

        parse_track_page(number, &html)
    }
}

/// Extract `(status, checkpoint)` from a tracking page body
fn parse_track_page(number: &str, html: &str) -> Result<Observation, LookupError> {
    let parse_error = |message: &str| LookupError::Parse {
        courier: UNIUNI,
        number: number.to_string(),
        message: message.to_string(),
    };

    let captures = nuxt_payload_re()
        .captures(html)
        .ok_or_else(|| parse_error("no embedded __NUXT__ payload"))?;

    let data: serde_json::Value = serde_json::from_str(&captures[1])
        .map_err(|e| parse_error(&format!("bad __NUXT__ JSON: {e}")))?;

    let items = &data["state"]["track"]["items"];
    let Some(item) = items.get(0) else {
        return Err(LookupError::NotFound {
            courier: UNIUNI,
            number: number.to_string(),
        });
    };

    let status = item["status"]
        .as_str()
        .ok_or_else(|| parse_error("missing status field"))?
        .to_string();

    let checkpoint = item
        .get("lastEvent")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    Ok(Observation { status, checkpoint })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn portal_page(payload: &str) -> String {
        format!(
            "<html><body><div id=\"__nuxt\"></div>\
             <script>window.__NUXT__={payload};</script></body></html>"
        )
    }

    #[test]
    fn test_parse_track_page() {
        let page = portal_page(
            r#"{"state":{"track":{"items":[{"status":"In Transit","lastEvent":"Warehouse A, 2026-08-05 21:14"}]}}}"#,
        );

        let observation = parse_track_page("UUS123", &page).unwrap();
        assert_eq!(observation.status, "In Transit");
        assert_eq!(observation.checkpoint, "Warehouse A, 2026-08-05 21:14");
    }

    #[test]
    fn test_parse_track_page_without_last_event() {
        let page = portal_page(r#"{"state":{"track":{"items":[{"status":"Delivered"}]}}}"#);

        let observation = parse_track_page("UUS123", &page).unwrap();
        assert_eq!(observation.status, "Delivered");
        assert_eq!(observation.checkpoint, "");
    }

    #[test]
    fn test_parse_track_page_no_items_is_not_found() {
        let page = portal_page(r#"{"state":{"track":{"items":[]}}}"#);

        let err = parse_track_page("UUS999", &page).unwrap_err();
        assert!(matches!(err, LookupError::NotFound { .. }));
    }

    #[test]
    fn test_parse_track_page_without_payload_is_parse_error() {
        let err = parse_track_page("UUS123", "<html><body>loading...</body></html>").unwrap_err();
        assert!(matches!(err, LookupError::Parse { .. }));
    }

    #[test]
    fn test_parse_track_page_missing_status_is_parse_error() {
        let page = portal_page(r#"{"state":{"track":{"items":[{"lastEvent":"somewhere"}]}}}"#);

        let err = parse_track_page("UUS123", &page).unwrap_err();
        assert!(matches!(err, LookupError::Parse { .. }));
    }
}
