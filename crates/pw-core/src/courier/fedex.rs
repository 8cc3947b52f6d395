//! FedEx tracking backend
//!
//! Uses the `trackingCal` JSON endpoint behind fedex.com's own tracking
//! page: a form POST carrying a `TrackPackagesRequest` document, answered
//! with a `TrackPackagesResponse` whose `packageList` holds one entry per
//! requested number.

use super::{CourierBackend, FEDEX, LookupError, Observation};

const TRACK_URL: &str = "https://www.fedex.com/trackingCal/track";

/// Backend querying FedEx's tracking endpoint
pub struct FedexBackend {
    client: reqwest::blocking::Client,
}

impl FedexBackend {
    pub fn new(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl CourierBackend for FedexBackend {
    fn resolve(&self, number: &str) -> Result<Observation, LookupError> {
        let request = serde_json::json!({
            "TrackPackagesRequest": {
                "appType": "WTRK",
                "uniqueKey": "",
                "processingParameters": {},
                "trackingInfoList": [{
                    "trackNumberInfo": {
                        "trackingNumber": number,
                        "trackingQualifier": "",
                        "trackingCarrier": ""
                    }
                }]
            }
        });

        let http_error = |e: reqwest::Error| LookupError::Http {
            courier: FEDEX,
            number: number.to_string(),
            source: e,
        };

        let body: serde_json::Value = self
            .client
            .post(TRACK_URL)
            .form(&[
                ("data", request.to_string().as_str()),
                ("action", "trackpackages"),
                ("locale", "en_US"),
                ("version", "1"),
                ("format", "json"),
            ])
            .send()
            .map_err(http_error)?
            .json()
            .map_err(http_error)?;

        parse_track_reply(number, &body)
    }
}

/// Extract `(status, checkpoint)` from a `TrackPackagesResponse` document
fn parse_track_reply(number: &str, body: &serde_json::Value) -> Result<Observation, LookupError> {
    let not_found = || LookupError::NotFound {
        courier: FEDEX,
        number: number.to_string(),
    };

    let package = body["TrackPackagesResponse"]["packageList"]
        .get(0)
        .ok_or_else(not_found)?;

    // An unknown number still yields a package entry, with an empty
    // keyStatus and an error flagged on the entry itself.
    let status = package["keyStatus"]
        .as_str()
        .filter(|s| !s.is_empty())
        .ok_or_else(not_found)?
        .to_string();

    let checkpoint = package["scanEventList"]
        .get(0)
        .map(format_scan_event)
        .unwrap_or_default();

    Ok(Observation { status, checkpoint })
}

/// Render the most recent scan event as a single checkpoint line
fn format_scan_event(event: &serde_json::Value) -> String {
    let mut parts = Vec::new();
    for key in ["scanLocation", "date", "time"] {
        if let Some(value) = event[key].as_str()
            && !value.is_empty()
        {
            parts.push(value);
        }
    }
    parts.join(" ")
}
