//! Object key derivation
//!
//! Keys are always derived on the server and take the shape
//! `{namespace}/{entity ids...}/{subpath}/{timestamp millis}-{random id}[.{ext}]`.
//! Nothing from the uploaded file name reaches the key except a sanitized,
//! lowercase, alphanumeric extension.

use std::fmt;
use std::sync::Arc;

use rand::Rng;
use strum::{AsRefStr, Display, EnumString};

use crate::clock::{Clock, SystemClock};
use crate::error::KeyError;

const RANDOM_ID_LEN: usize = 12;
const RANDOM_ID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const MAX_EXTENSION_LEN: usize = 10;

/// Top-level key prefix, one per kind of owning record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Namespace {
    /// Photos attached to registry list items
    ListItems,
    /// Profile pictures
    Profiles,
    /// Images embedded in notes
    Notes,
    /// Uploads not yet attached to a record
    Uploads,
}

/// Source of the random component of a key
pub trait IdSource: Send + Sync {
    /// Returns a fresh id made of characters safe for a key segment
    fn next_id(&self) -> String;
}

/// Lowercase alphanumeric ids from the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdSource;

impl IdSource for RandomIdSource {
    fn next_id(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..RANDOM_ID_LEN)
            .map(|_| char::from(RANDOM_ID_ALPHABET[rng.gen_range(0..RANDOM_ID_ALPHABET.len())]))
            .collect()
    }
}

/// Server-derived object key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Borrow the key as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Derives collision-resistant, tenant-scoped object keys
#[derive(Clone)]
pub struct ObjectKeyDeriver {
    ids: Arc<dyn IdSource>,
    clock: Arc<dyn Clock>,
}

impl Default for ObjectKeyDeriver {
    fn default() -> Self {
        Self::new(Arc::new(RandomIdSource), Arc::new(SystemClock))
    }
}

impl ObjectKeyDeriver {
    /// Creates a deriver from an id source and a clock
    #[must_use]
    pub fn new(ids: Arc<dyn IdSource>, clock: Arc<dyn Clock>) -> Self {
        Self { ids, clock }
    }

    /// Derives a new key for an object owned by `entity_ids` under `namespace`
    ///
    /// # Arguments
    ///
    /// * `namespace` - Top-level prefix
    /// * `entity_ids` - Owning record ids, outermost first; may be empty
    /// * `subpath` - One or more `/`-separated segments, e.g. `images`
    /// * `original_file_name` - Client-supplied name, used only for its extension
    ///
    /// # Errors
    ///
    /// Returns `KeyError::InvalidEntityId` or `KeyError::InvalidSubpath` when a
    /// segment contains anything other than ASCII alphanumerics, `-` or `_`,
    /// and `KeyError::InvalidGeneratedId` if the id source yields such a segment
    pub fn derive(
        &self,
        namespace: Namespace,
        entity_ids: &[&str],
        subpath: &str,
        original_file_name: &str,
    ) -> Result<ObjectKey, KeyError> {
        let mut segments: Vec<&str> = Vec::with_capacity(entity_ids.len() + 3);
        segments.push(namespace.as_ref());

        for id in entity_ids {
            if !is_safe_segment(id) {
                return Err(KeyError::InvalidEntityId((*id).to_string()));
            }
            segments.push(id);
        }

        for part in subpath.split('/') {
            if !is_safe_segment(part) {
                return Err(KeyError::InvalidSubpath(subpath.to_string()));
            }
            segments.push(part);
        }

        let timestamp = self.clock.now().timestamp_millis();
        let random_id = self.ids.next_id();
        if !is_safe_segment(&random_id) {
            return Err(KeyError::InvalidGeneratedId(random_id));
        }
        let file = match sanitize_extension(original_file_name) {
            Some(ext) => format!("{timestamp}-{random_id}.{ext}"),
            None => format!("{timestamp}-{random_id}"),
        };
        segments.push(&file);

        Ok(ObjectKey(segments.join("/")))
    }
}

fn is_safe_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Extracts a lowercase alphanumeric extension from a client file name
///
/// Returns `None` when there is no usable extension.
#[must_use]
pub fn sanitize_extension(file_name: &str) -> Option<String> {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let (stem, ext) = base.rsplit_once('.')?;

    if stem.is_empty()
        || ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.bytes().all(|b| b.is_ascii_alphanumeric())
    {
        return None;
    }

    Some(ext.to_ascii_lowercase())
}
