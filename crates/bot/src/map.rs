//! Turns hazard markers into a static map image url. The api key lives only
//! here; the rest of the bot sees finished urls.

use std::fmt;

use model::report::{HazardMarker, ReportKind};
use reqwest::Url;
use utility::config;

pub const GOOGLE_STATIC_MAP_URL: &str = "https://maps.googleapis.com/maps/api/staticmap";

pub trait MapRenderer: Send + Sync {
    /// Url of an image showing all markers, `None` if no image can be made.
    fn render(&self, markers: &[HazardMarker]) -> Option<String>;
}

/// Used when no map service is configured; callers fall back to text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMap;

impl MapRenderer for NoMap {
    fn render(&self, _markers: &[HazardMarker]) -> Option<String> {
        None
    }
}

#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self(key.into())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct GoogleStaticMap {
    api_key: ApiKey,
    width: u32,
    height: u32,
}

impl GoogleStaticMap {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            width: 600,
            height: 400,
        }
    }

    /// `None` when `GOOGLE_MAPS_API_KEY` is not set.
    pub fn from_env() -> Option<Self> {
        config::optional("GOOGLE_MAPS_API_KEY").map(|key| Self::new(ApiKey::new(key)))
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    fn marker_param(marker: &HazardMarker) -> String {
        let color = match marker.kind {
            ReportKind::Roadblock => "red",
            ReportKind::Hazard => "orange",
        };
        format!(
            "color:{}|label:{}|{},{}",
            color,
            marker.kind.marker_label(),
            marker.location.latitude(),
            marker.location.longitude()
        )
    }
}

impl MapRenderer for GoogleStaticMap {
    fn render(&self, markers: &[HazardMarker]) -> Option<String> {
        if markers.is_empty() {
            return None;
        }
        let mut params = vec![("size", format!("{}x{}", self.width, self.height))];
        params.extend(
            markers
                .iter()
                .map(|marker| ("markers", Self::marker_param(marker))),
        );
        params.push(("key", self.api_key.0.clone()));

        match Url::parse_with_params(GOOGLE_STATIC_MAP_URL, &params) {
            Ok(url) => Some(url.into()),
            Err(why) => {
                log::error!("could not build map url: {}", why);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use model::location::Location;

    use super::*;

    fn marker(kind: ReportKind, latitude: f64, longitude: f64) -> HazardMarker {
        HazardMarker {
            kind,
            location: Location::new(latitude, longitude).unwrap(),
        }
    }

    #[test]
    fn one_marker_per_hazard() {
        let renderer = GoogleStaticMap::new(ApiKey::new("test-key"));
        let url = renderer
            .render(&[
                marker(ReportKind::Roadblock, 40.0, -73.0),
                marker(ReportKind::Hazard, 40.005, -73.002),
            ])
            .unwrap();
        let url = Url::parse(&url).unwrap();
        assert_eq!(url.host_str(), Some("maps.googleapis.com"));
        assert_eq!(url.path(), "/maps/api/staticmap");

        let pairs = url.query_pairs().into_owned().collect::<Vec<_>>();
        assert_eq!(pairs[0], ("size".to_owned(), "600x400".to_owned()));
        let markers = pairs
            .iter()
            .filter(|(name, _)| name == "markers")
            .map(|(_, value)| value.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            markers,
            vec!["color:red|label:R|40,-73", "color:orange|label:H|40.005,-73.002"]
        );
        assert!(pairs.contains(&("key".to_owned(), "test-key".to_owned())));
    }

    #[test]
    fn nothing_to_draw() {
        let renderer = GoogleStaticMap::new(ApiKey::new("test-key"));
        assert_eq!(renderer.render(&[]), None);
        assert_eq!(NoMap.render(&[marker(ReportKind::Hazard, 1.0, 1.0)]), None);
    }

    #[test]
    fn custom_size() {
        let url = GoogleStaticMap::new(ApiKey::new("k"))
            .with_size(320, 240)
            .render(&[marker(ReportKind::Hazard, 1.0, 2.0)])
            .unwrap();
        assert!(url.contains("size=320x240"));
    }

    #[test]
    fn key_is_not_debug_printed() {
        let renderer = GoogleStaticMap::new(ApiKey::new("very-secret"));
        assert!(!format!("{:?}", renderer).contains("very-secret"));
    }
}
