//!
//! Small helpers shared by the configuration and middleware layers.
//!
//! - [`Sensitive`] hides secrets (the store password) from debug output
//! - [`RequestIdGenerator`] preserves or mints `x-request-id` values
//! - [`replace_handlebars_with_env`] substitutes `{{ VAR }}` in config files
//! - [`rfc3339_now`] timestamps error diagnostics
//!

use {
    http::{HeaderValue, Request},
    regex::{Captures, Regex},
    serde::Deserialize,
    std::{env, sync::LazyLock, time::SystemTime},
    tower_http::request_id::{MakeRequestId, RequestId},
    uuid::{ContextV7, Timestamp, Uuid},
    zeroize::{Zeroize, ZeroizeOnDrop},
};

/// Matches `{{ VAR_NAME }}` with optional whitespace around the name.
static HANDLEBAR_REGEXP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Z0-9_]+)\s*\}\}").unwrap());

/// A wrapper for secrets that prints as `Sensitive(****)` and zeroes its
/// memory on drop.
///
/// ```
/// use folio_content::Sensitive;
///
/// let password = Sensitive::from("hunter2");
/// assert_eq!(format!("{:?}", password), "Sensitive(****)");
/// assert_eq!(password.0, "hunter2");
/// ```
#[derive(Clone, Deserialize, Default, Zeroize, ZeroizeOnDrop)]
pub struct Sensitive<T: Default + Zeroize>(pub T);

impl Sensitive<String> {
    /// Creates a new `Sensitive<String>` from a string slice.
    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl<T: Default + Zeroize + PartialEq> PartialEq for Sensitive<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T: Default + Zeroize> std::fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sensitive(****)")
    }
}

/// Request ID generator for log correlation.
///
/// Keeps an incoming `x-request-id` header, otherwise mints a UUIDv7 so ids
/// sort by creation time.
///
/// ```text
/// Client Request
///     │
///     ├─ Has x-request-id header? ─> Preserve it
///     │
///     └─ No header? ─> Generate new UUIDv7
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequestIdGenerator;

impl MakeRequestId for RequestIdGenerator {
    fn make_request_id<B>(&mut self, req: &Request<B>) -> Option<RequestId> {
        match req.headers().get("x-request-id") {
            Some(value) => Some(RequestId::new(value.clone())),
            None => {
                let cx = ContextV7::new().with_additional_precision();
                let uuid = Uuid::new_v7(Timestamp::now(cx));
                let value = HeaderValue::from_str(&uuid.to_string()).ok()?;
                Some(RequestId::new(value))
            }
        }
    }
}

/// Replaces `{{ VAR_NAME }}` placeholders with environment variable values.
///
/// Missing variables become empty strings (and are logged), so a required
/// credential left unset surfaces later as a validation error rather than a
/// TOML syntax error.
///
/// ```
/// use folio_content::replace_handlebars_with_env;
///
/// let template = "Value: {{ FOLIO_SURELY_MISSING_VAR }}";
/// assert_eq!(replace_handlebars_with_env(template), "Value: ");
/// ```
pub fn replace_handlebars_with_env(input: &str) -> String {
    HANDLEBAR_REGEXP
        .replace_all(input, |caps: &Captures| {
            let var_name = &caps[1];
            env::var(var_name).unwrap_or_else(|_| {
                tracing::warn!(
                    variable = %var_name,
                    "Environment variable not found, substituting with empty string"
                );
                String::new()
            })
        })
        .to_string()
}

/// Current time as an RFC 3339 string with millisecond precision.
pub fn rfc3339_now() -> String {
    humantime::format_rfc3339_millis(SystemTime::now()).to_string()
}
