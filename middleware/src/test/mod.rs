//! Unit test module
//!
//! Stage unit tests live here, separate from source files.
//! Tests interact with stages via their public APIs.

mod support;

mod anti_spam_test;
mod permission_test;
mod user_tracking_test;
