//! Cookie grammar subsystem.
//!
//! # Data Flow
//! ```text
//! Set-Cookie header value (from upstream)
//!     → parser.rs (name/value pair, fatal errors)
//!     → attributes.rs (per-attribute dispatch, non-fatal)
//!     → Cookie (types.rs)
//!
//! Cookie
//!     → Display (Set-Cookie form, back to the client)
//!     → request_pair() (Cookie form, towards the upstream)
//! ```
//!
//! # Design Decisions
//! - Follows the RFC 6265 server grammar; this is not a cookie jar
//! - Attribute failures degrade only the attribute, never the line
//! - Value octets limited to visible ASCII minus `"`, `;` and `\`

pub mod attributes;
pub mod error;
pub mod parser;
pub mod types;

pub use attributes::Attribute;
pub use error::{AttributeError, CookieError};
pub use parser::{is_valid_cookie_name, parse_set_cookie};
pub use types::{Cookie, MaxAge, SameSite};
