//! OAuth2 credential lifecycle.
//!
//! Layering is strict: [`InteractiveAuthenticator`] depends on
//! [`OAuth2Client`], never the reverse.
//!
//! ## Token File Format
//!
//! ```json
//! {
//!   "access_token": "ya29...",
//!   "refresh_token": "1//0g...",
//!   "token_type": "Bearer",
//!   "expires_in": 3599,
//!   "expires_at": 1735689600000
//! }
//! ```

pub mod callback;
pub mod client;
pub mod config;
pub mod interactive;

pub use callback::{CALLBACK_PATH, CallbackListener};
pub use client::{ClientState, OAuth2Client, RefreshHook, UserInfo};
pub use config::OAuthConfig;
pub use interactive::{
    BrowserLauncher, DEFAULT_AUTH_TIMEOUT, InteractiveAuthenticator, SystemBrowser,
    generate_state,
};
