//! Domain entities for fragments
//!
//! A Fragment is the metadata half of a stored, owned, typed byte payload.
//! The payload itself never lives on the entity: it is written and read
//! through the storage port, keyed by the same `(owner_id, id)` pair.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::conversion;
use crate::fragment::error::{FragmentError, Result};
use crate::fragment::ids::{FragmentId, OwnerId};
use crate::fragment::media::{ContentType, MediaType};

/// Wire shape of fragment metadata (no payload)
///
/// This is what callers see and what storage backends persist. Turning it
/// back into a [`Fragment`] re-runs every constructor check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentView {
    pub id: FragmentId,
    pub owner_id: OwnerId,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(rename = "type")]
    pub content_type: String,
    pub size: u64,
}

/// Constructor input for [`Fragment::construct`]
///
/// `id`, `created` and `updated` default to a fresh id and the current time.
#[derive(Debug, Clone, Default)]
pub struct NewFragment {
    pub id: Option<FragmentId>,
    pub owner_id: Option<OwnerId>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub content_type: Option<String>,
    pub size: u64,
}

/// Validated fragment metadata
///
/// Invariants, checked at construction:
/// - `owner_id` and `content_type` are present
/// - the base media type of `content_type` is supported
///
/// `id`, `owner_id`, `created` and the base media type never change after
/// construction. `size` and `updated` only move when a payload is written.
///
/// # Example
///
/// ```rust
/// use fragments_domain::fragment::{Fragment, MediaType, OwnerId};
///
/// let owner = OwnerId::parse("user-1").unwrap();
/// let fragment = Fragment::new(owner, "text/markdown; charset=utf-8").unwrap();
/// assert_eq!(fragment.mime_type(), MediaType::TextMarkdown);
/// assert_eq!(fragment.size(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "FragmentView", into = "FragmentView")]
pub struct Fragment {
    id: FragmentId,
    owner_id: OwnerId,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
    content_type: String,
    media_type: MediaType,
    size: u64,
}

impl Fragment {
    /// Create a fresh, empty fragment for `owner_id`
    pub fn new(owner_id: OwnerId, content_type: &str) -> Result<Self> {
        Self::construct(NewFragment {
            owner_id: Some(owner_id),
            content_type: Some(content_type.to_string()),
            ..NewFragment::default()
        })
    }

    /// Validate constructor input and build a Fragment
    ///
    /// # Errors
    ///
    /// - `FragmentError::Validation` if the owner or type is missing
    /// - `FragmentError::UnsupportedType` if the type does not parse or its
    ///   base media type is not supported
    pub fn construct(input: NewFragment) -> Result<Self> {
        let (Some(owner_id), Some(content_type)) = (input.owner_id, input.content_type) else {
            return Err(FragmentError::validation("ownerId and type are required"));
        };

        let media_type = ContentType::parse(&content_type)?
            .media_type()
            .ok_or_else(|| FragmentError::unsupported_type(content_type.as_str()))?;

        let timestamp = now();
        Ok(Self {
            id: input.id.unwrap_or_default(),
            owner_id,
            created: input.created.map_or(timestamp, |time| time.trunc_subsecs(3)),
            updated: input.updated.map_or(timestamp, |time| time.trunc_subsecs(3)),
            content_type,
            media_type,
            size: input.size,
        })
    }

    pub fn id(&self) -> &FragmentId {
        &self.id
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    pub fn created(&self) -> &DateTime<Utc> {
        &self.created
    }

    pub fn updated(&self) -> &DateTime<Utc> {
        &self.updated
    }

    /// The full Content-Type as supplied at creation, parameters included
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Size in bytes of the last payload written
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Base media type, parameters such as charset stripped
    pub fn mime_type(&self) -> MediaType {
        self.media_type
    }

    pub fn is_text(&self) -> bool {
        self.media_type.is_text()
    }

    /// Media types this fragment may be converted to, its own type first
    pub fn supported_conversion_targets(&self) -> &'static [MediaType] {
        conversion::conversion_targets(self.media_type)
    }

    /// Convert `payload` (this fragment's data) into `target`
    ///
    /// # Errors
    ///
    /// - `FragmentError::UnsupportedConversion` if `target` is not reachable
    /// - `FragmentError::ConversionNotImplemented` if no rule exists for the pair
    /// - `FragmentError::MalformedPayload` if the payload is not valid for its type
    pub fn convert(&self, payload: &[u8], target: MediaType) -> Result<Vec<u8>> {
        if target == self.media_type {
            return Ok(payload.to_vec());
        }
        if !conversion::can_convert(self.media_type, target) {
            return Err(FragmentError::UnsupportedConversion {
                from: self.media_type,
                to: target,
            });
        }
        conversion::convert(payload, self.media_type, target)
    }

    /// Record a payload write of `size` bytes
    pub(crate) fn record_payload_write(&mut self, size: u64) {
        self.size = size;
        self.updated = now();
    }

    /// Metadata snapshot for callers and storage
    pub fn view(&self) -> FragmentView {
        FragmentView {
            id: self.id.clone(),
            owner_id: self.owner_id.clone(),
            created: self.created,
            updated: self.updated,
            content_type: self.content_type.clone(),
            size: self.size,
        }
    }

    /// True if `value` parses as a Content-Type with a supported base type
    pub fn is_supported_type(value: &str) -> bool {
        ContentType::parse(value)
            .map(|ct| ct.media_type().is_some())
            .unwrap_or(false)
    }

    /// Canonical media type for a filename extension such as `.md`
    pub fn mime_type_for_extension(ext: &str) -> Option<MediaType> {
        MediaType::from_extension(ext)
    }
}

impl TryFrom<FragmentView> for Fragment {
    type Error = FragmentError;

    fn try_from(view: FragmentView) -> Result<Self> {
        Self::construct(NewFragment {
            id: Some(view.id),
            owner_id: Some(view.owner_id),
            created: Some(view.created),
            updated: Some(view.updated),
            content_type: Some(view.content_type),
            size: view.size,
        })
    }
}

/// Timestamps are kept at millisecond precision, the resolution every backend stores
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

impl From<Fragment> for FragmentView {
    fn from(fragment: Fragment) -> Self {
        FragmentView {
            id: fragment.id,
            owner_id: fragment.owner_id,
            created: fragment.created,
            updated: fragment.updated,
            content_type: fragment.content_type,
            size: fragment.size,
        }
    }
}
