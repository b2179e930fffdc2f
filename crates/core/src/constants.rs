//! Constants used throughout the ERA core crate.
//!
//! Defaults for configuration, mail content and the generation providers live here so the
//! binaries and tests agree on them.

/// Default listening port when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;

/// Default bind host for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default directory for transient upload files.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";

/// Default directory for the static form page and assets.
pub const DEFAULT_PUBLIC_DIR: &str = "public";

/// Upload size ceiling for screenshots and shared examples (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Service name reported by the health endpoint.
pub const SERVICE_NAME: &str = "ERA Webpage Generator";

/// Observer address copied on every generated webpage and shared example.
pub const DEFAULT_OBSERVER_EMAIL: &str = "kmrkva@alumni.nd.edu";

/// Default SMTP relay.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Subject line of the generated webpage email.
pub const GENERATED_EMAIL_SUBJECT: &str = "Your Generated Consumer Choice Webpage - ERA";

/// Subject line of the shared example notification.
pub const SHARED_EXAMPLE_EMAIL_SUBJECT: &str = "New ERA example shared";

/// Filename of the generated page attached to the email.
pub const GENERATED_ATTACHMENT_NAME: &str = "generated-webpage.html";

/// Base URL of the v0 generation API.
pub const DEFAULT_V0_BASE_URL: &str = "https://api.v0.dev";

/// Base URL of the chat-completions generation API.
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";

/// Model requested from the chat-completions API.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";

/// Per-request timeout for the generation provider, in seconds.
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 120;

/// `max_tokens` for a single chat-completions generation.
pub const CHAT_MAX_TOKENS: u32 = 4096;
