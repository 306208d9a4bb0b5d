//! Navigation targets and the amap.com URI they open.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use talkmap_client::TravelMode;
use talkmap_core::GeoPoint;

/// Characters left unescaped in the `name` query parameter. Matches the
/// unreserved set browsers use for URI components.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

const AMAP_NAVIGATION: &str = "https://uri.amap.com/navigation";

/// Everything an external navigation app needs to route to a result.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationTarget {
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub label: String,
    pub mode: TravelMode,
}

impl NavigationTarget {
    /// Walking directions from `from` to `to`.
    pub fn walking(from: GeoPoint, to: GeoPoint, label: impl Into<String>) -> Self {
        Self {
            from,
            to,
            label: label.into(),
            mode: TravelMode::Walking,
        }
    }
}

/// Hands a [`NavigationTarget`] to whatever can open it.
pub trait NavigationOpener {
    /// # Errors
    ///
    /// Returns an I/O error if the target could not be handed off.
    fn open(&self, target: &NavigationTarget) -> std::io::Result<()>;
}

/// Builds the amap.com navigation URI for `target`.
#[must_use]
pub fn amap_navigation_url(target: &NavigationTarget) -> String {
    let name = utf8_percent_encode(&target.label, COMPONENT);
    format!(
        "{AMAP_NAVIGATION}?from={}&to={}&name={name}&mode={}",
        target.from.lng_lat(),
        target.to.lng_lat(),
        target.mode
    )
}
