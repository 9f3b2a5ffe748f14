//! Egress guard: blocks outbound requests whose body carries student
//! identity keys.
//!
//! The check is on key names only. A name stored under an unexpected key
//! (a free-text `bio`, say) is not detected; callers must keep identity out
//! of such fields themselves. The guard is on by default in every build and
//! can only be turned off through [`GuardPolicy`]. A body that is declared
//! or shaped as JSON but cannot be parsed is blocked rather than sent
//! unscanned.
//!
//! ```
//! use bridge_core::guard::{scan, Value};
//!
//! let body = Value::parse_json(r#"{"submission_id":"abc","student":{"firstName":"Jo"}}"#)
//!     .unwrap();
//! assert_eq!(scan(&body), vec!["student.firstName"]);
//! ```

mod call;
mod scan;
mod value;

pub use call::{
    GuardError, GuardPolicy, GuardedClient, PiiViolationError, RequestOptions, Transport,
    UnscannableBodyError,
};
pub use scan::{scan, validate_no_pii, Denylist, DEFAULT_PII_KEYS};
pub use value::Value;
