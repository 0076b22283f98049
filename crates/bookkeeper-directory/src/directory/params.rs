//! Query-string shape of [`FilterRequest`]: `q`, `entity`, `city`, repeated `service`,
//! `available`/`verified`/`nearMe` as `"true"` or absent, and `userLat`/`userLng`.

use tracing::debug;
use url::form_urlencoded;

use super::domain::{CategoryId, CityId};
use super::filter::FilterRequest;

impl FilterRequest {
    /// Decodes a raw query string. Malformed values are dropped rather than rejected.
    pub fn from_query(raw: &str) -> Self {
        let mut request = FilterRequest::default();

        for (key, value) in form_urlencoded::parse(raw.trim_start_matches('?').as_bytes()) {
            let value = value.trim();
            match key.as_ref() {
                "q" => request.text = non_empty(value),
                "entity" => request.entity = non_empty(value),
                "city" => request.city = non_empty(value).map(CityId),
                "service" => {
                    if let Some(id) = non_empty(value) {
                        request.services.insert(CategoryId(id));
                    }
                }
                "available" => request.only_available = is_true(value),
                "verified" => request.only_verified = is_true(value),
                "nearMe" => request.near_me = is_true(value),
                "userLat" => request.user_lat = parse_degrees(&key, value),
                "userLng" => request.user_lng = parse_degrees(&key, value),
                other => debug!(parameter = other, "ignoring unrecognised query parameter"),
            }
        }

        request
    }

    /// Encodes the request so that [`FilterRequest::from_query`] yields an equivalent value.
    pub fn to_query(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());

        if let Some(text) = self.text.as_deref().and_then(trimmed) {
            serializer.append_pair("q", text);
        }
        if let Some(entity) = self.entity.as_deref().and_then(trimmed) {
            serializer.append_pair("entity", entity);
        }
        if let Some(city) = self.city.as_ref().and_then(|city| trimmed(&city.0)) {
            serializer.append_pair("city", city);
        }
        for service in self.services.iter().filter_map(|service| trimmed(&service.0)) {
            serializer.append_pair("service", service);
        }
        if self.only_available {
            serializer.append_pair("available", "true");
        }
        if self.only_verified {
            serializer.append_pair("verified", "true");
        }
        if self.near_me {
            serializer.append_pair("nearMe", "true");
        }
        if let Some(lat) = self.user_lat {
            serializer.append_pair("userLat", &lat.to_string());
        }
        if let Some(lng) = self.user_lng {
            serializer.append_pair("userLng", &lng.to_string());
        }

        serializer.finish()
    }
}

fn trimmed(value: &str) -> Option<&str> {
    Some(value.trim()).filter(|value| !value.is_empty())
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn is_true(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

fn parse_degrees(key: &str, value: &str) -> Option<f64> {
    match value.parse::<f64>() {
        Ok(degrees) if degrees.is_finite() => Some(degrees),
        _ => {
            debug!(parameter = key, value, "ignoring malformed coordinate");
            None
        }
    }
}
