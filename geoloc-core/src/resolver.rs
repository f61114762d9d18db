use reqwest::{Client, Url};
use std::sync::LazyLock;
use thiserror::Error;

use crate::{
    Location,
    dedup::remove_overlapping,
    transport::{Transport, TransportError},
};

/// OpenWeather direct geocoding endpoint.
pub const OPEN_WEATHER_GEOCODING_URL: &str = "https://api.openweathermap.org/geo/1.0/direct";

static OPEN_WEATHER_ENDPOINT: LazyLock<Url> = LazyLock::new(|| {
    Url::parse(OPEN_WEATHER_GEOCODING_URL)
        .expect("built-in geocoding endpoint is a valid URL")
});

/// Number of matches requested when the caller passes a limit of zero.
pub const DEFAULT_MAX_RESULTS: usize = 10;

/// Ways a [`LocationResolver::find_location`] call can fail.
#[derive(Debug, Error)]
pub enum LocationError {
    /// The request could not be sent or the response could not be read.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The body is not a JSON array of location records.
    #[error("failed to decode geocoding response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The geocoding service returned no match for the query.
    #[error("location not found")]
    NotFound,
}

impl LocationError {
    /// True for [`LocationError::NotFound`], so callers can ask for a better query.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LocationError::NotFound)
    }
}

/// Resolves place names to [`Location`]s through the OpenWeather geocoding API.
#[derive(Debug, Clone)]
pub struct LocationResolver<T> {
    transport: T,
    api_key: String,
    endpoint: Url,
}

impl LocationResolver<Client> {
    /// Resolver backed by a fresh reqwest client and the public OpenWeather endpoint.
    pub fn openweather(api_key: impl Into<String>) -> Self {
        Self::new(Client::new(), api_key)
    }
}

impl<T: Transport> LocationResolver<T> {
    /// Resolver sending requests through `transport` to the public OpenWeather endpoint.
    pub fn new(transport: T, api_key: impl Into<String>) -> Self {
        Self::with_endpoint(transport, api_key, OPEN_WEATHER_ENDPOINT.clone())
    }

    /// Resolver against a custom geocoding endpoint, e.g. a mock server.
    pub fn with_endpoint(transport: T, api_key: impl Into<String>, endpoint: Url) -> Self {
        Self {
            transport,
            api_key: api_key.into(),
            endpoint,
        }
    }

    /// Base URL the query parameters are appended to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Query URL for `name`; a `max_results` of zero becomes [`DEFAULT_MAX_RESULTS`].
    pub fn request_url(&self, name: &str, max_results: usize) -> Url {
        let limit = if max_results == 0 {
            DEFAULT_MAX_RESULTS
        } else {
            max_results
        };

        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", name)
            .append_pair("limit", &limit.to_string())
            .append_pair("appid", &self.api_key);

        url
    }

    /// Looks up `name` and returns the matching locations, near-duplicates removed.
    ///
    /// Issues exactly one request. The name is passed through as given, so an
    /// empty or odd query is left for the service to judge. An empty answer is
    /// reported as [`LocationError::NotFound`].
    pub async fn find_location(
        &self,
        name: &str,
        max_results: usize,
    ) -> Result<Vec<Location>, LocationError> {
        let url = self.request_url(name, max_results);
        tracing::debug!(query = name, url = %redact_key(&url), "querying geocoding service");

        let body = self.transport.get(url).await?;
        let matches: Vec<Location> = serde_json::from_slice(&body)?;
        tracing::debug!(query = name, matches = matches.len(), "geocoding response decoded");

        match matches.len() {
            0 => Err(LocationError::NotFound),
            1 => Ok(matches),
            // The API tends to return the same place several times.
            _ => Ok(remove_overlapping(matches)),
        }
    }
}

fn redact_key(url: &Url) -> Url {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "appid" { "***".to_string() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();

    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::{io, sync::Mutex};

    /// Replays a canned response and records every requested URL.
    struct FakeTransport {
        response: Result<&'static str, io::ErrorKind>,
        requests: Mutex<Vec<Url>>,
    }

    impl FakeTransport {
        fn ok(body: &'static str) -> Self {
            Self {
                response: Ok(body),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn failing(kind: io::ErrorKind) -> Self {
            Self {
                response: Err(kind),
                requests: Mutex::new(Vec::new()),
            }
        }

        fn requests(&self) -> Vec<Url> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn get(&self, url: Url) -> Result<Bytes, TransportError> {
            self.requests.lock().unwrap().push(url);
            match self.response {
                Ok(body) => Ok(Bytes::from_static(body.as_bytes())),
                Err(kind) => Err(TransportError::new(io::Error::new(kind, "connection failed"))),
            }
        }
    }

    fn query_param(url: &Url, key: &str) -> Option<String> {
        url.query_pairs().find(|(k, _)| k == key).map(|(_, v)| v.into_owned())
    }

    const SPRINGFIELDS: &str = r#"[
        {"name": "Springfield", "state": "Illinois", "country": "US",
         "lat": 39.7817, "lon": -89.6501},
        {"name": "Springfield", "state": "Illinois", "country": "US",
         "lat": 39.7990, "lon": -89.6440},
        {"name": "Springfield", "state": "Missouri", "country": "US",
         "lat": 37.2090, "lon": -93.2923}
    ]"#;

    #[tokio::test]
    async fn empty_array_is_not_found() {
        let transport = FakeTransport::ok("[]");
        let resolver = LocationResolver::new(&transport, "KEY");

        let err = resolver.find_location("Nowhere", 5).await.unwrap_err();

        assert!(matches!(err, LocationError::NotFound));
        assert!(err.is_not_found());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn zero_limit_requests_the_default() {
        let transport = FakeTransport::ok("[]");
        let resolver = LocationResolver::new(&transport, "KEY");

        let _ = resolver.find_location("Warsaw", 0).await;
        let _ = resolver.find_location("Warsaw", 10).await;

        let requests = transport.requests();
        assert_eq!(query_param(&requests[0], "limit").as_deref(), Some("10"));
        assert_eq!(requests[0], requests[1]);
    }

    #[tokio::test]
    async fn request_carries_query_limit_and_key() {
        let transport = FakeTransport::ok("[]");
        let resolver = LocationResolver::new(&transport, "SECRET");

        let _ = resolver.find_location("São Paulo", 3).await;

        let url = &transport.requests()[0];
        assert_eq!(url.host_str(), Some("api.openweathermap.org"));
        assert_eq!(url.path(), "/geo/1.0/direct");
        assert_eq!(query_param(url, "q").as_deref(), Some("São Paulo"));
        assert_eq!(query_param(url, "limit").as_deref(), Some("3"));
        assert_eq!(query_param(url, "appid").as_deref(), Some("SECRET"));
    }

    #[tokio::test]
    async fn single_match_is_returned_as_is() {
        let transport = FakeTransport::ok(
            r#"[{"name": "Warsaw", "state": "Masovian Voivodeship", "country": "PL",
                 "lat": 52.2319581, "lon": 21.0067249}]"#,
        );
        let resolver = LocationResolver::new(&transport, "KEY");

        let found = resolver.find_location("Warsaw", 1).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].display_name(true), "Warsaw, Masovian Voivodeship, PL");
    }

    #[tokio::test]
    async fn null_state_in_response_is_accepted() {
        let transport = FakeTransport::ok(
            r#"[{"name": "Monaco", "state": null, "country": "MC",
                 "lat": 43.7384, "lon": 7.4246}]"#,
        );
        let resolver = LocationResolver::new(&transport, "KEY");

        let found = resolver.find_location("Monaco", 1).await.unwrap();

        assert_eq!(found.len(), 1);
        assert!(found[0].state.is_empty());
        assert_eq!(found[0].display_name(true), "Monaco, MC");
    }

    #[tokio::test]
    async fn multiple_matches_are_deduplicated() {
        let transport = FakeTransport::ok(SPRINGFIELDS);
        let resolver = LocationResolver::new(&transport, "KEY");

        let found = resolver.find_location("Springfield", 5).await.unwrap();

        let states: Vec<&str> = found.iter().map(|l| l.state.as_str()).collect();
        assert_eq!(states, ["Illinois", "Missouri"]);
        assert_eq!(found[0].lat, 39.7817);
    }

    #[tokio::test]
    async fn malformed_body_is_decode_error() {
        let transport = FakeTransport::ok(r#"{"cod": 401, "message": "Invalid API key"}"#);
        let resolver = LocationResolver::new(&transport, "KEY");

        let err = resolver.find_location("Warsaw", 1).await.unwrap_err();

        assert!(matches!(err, LocationError::Decode(_)));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn record_missing_required_field_is_decode_error() {
        let transport = FakeTransport::ok(r#"[{"name": "Warsaw", "lat": 52.2, "lon": 21.0}]"#);
        let resolver = LocationResolver::new(&transport, "KEY");

        let err = resolver.find_location("Warsaw", 1).await.unwrap_err();

        assert!(matches!(err, LocationError::Decode(_)));
    }

    #[tokio::test]
    async fn transport_error_is_passed_through() {
        let transport = FakeTransport::failing(io::ErrorKind::ConnectionRefused);
        let resolver = LocationResolver::new(&transport, "KEY");

        let err = resolver.find_location("Warsaw", 1).await.unwrap_err();

        let LocationError::Transport(inner) = &err else {
            panic!("expected transport error, got {err:?}");
        };
        let io_err = inner.inner().downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_err.kind(), io::ErrorKind::ConnectionRefused);
        assert_eq!(err.to_string(), "connection failed");
    }

    #[test]
    fn redacted_url_hides_the_key() {
        let resolver = LocationResolver::new(FakeTransport::ok("[]"), "SECRET");
        let url = redact_key(&resolver.request_url("Oslo", 2));

        assert!(!url.as_str().contains("SECRET"));
        assert_eq!(query_param(&url, "q").as_deref(), Some("Oslo"));
    }
}
