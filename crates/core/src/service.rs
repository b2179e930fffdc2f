//! Request pipelines.
//!
//! [`WebpageService`] owns the collaborators resolved at startup (generation client, mailer,
//! configuration) and runs the two submission flows. It knows nothing about HTTP; the REST crate
//! parses multipart bodies and stages uploads before calling in here.

use crate::config::EraConfig;
use crate::document::GeneratedDocument;
use crate::experiment::WebpageRequest;
use crate::generation::GenerationClient;
use crate::mail::{generated_webpage_email, shared_example_email, EmailAttachment, Mailer, OutboundEmail};
use crate::normalise::normalise;
use crate::prompt::{build_prompt, MINIMAL_PROMPT};
use crate::EraResult;
use std::sync::Arc;

/// Screenshot bytes with their declared MIME type.
#[derive(Clone, Debug)]
pub struct Screenshot {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

/// Result of a successful generation.
#[derive(Clone, Debug)]
pub struct WebpageOutcome {
    pub document: GeneratedDocument,
    pub prompt: String,
}

/// A file shared as an example, with its submitter's notes.
#[derive(Clone, Debug)]
pub struct SharedExample {
    pub submitter_email: Option<String>,
    pub description: Option<String>,
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

#[derive(Clone)]
pub struct WebpageService {
    cfg: Arc<EraConfig>,
    generator: Arc<dyn GenerationClient>,
    mailer: Arc<dyn Mailer>,
}

impl WebpageService {
    pub fn new(
        cfg: Arc<EraConfig>,
        generator: Arc<dyn GenerationClient>,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        Self {
            cfg,
            generator,
            mailer,
        }
    }

    pub fn config(&self) -> &EraConfig {
        &self.cfg
    }

    /// Prompt for a submission: the full builder when every required field is present, otherwise
    /// [`MINIMAL_PROMPT`].
    pub fn select_prompt(request: &WebpageRequest) -> String {
        match request.experiment_spec() {
            Some(spec) => build_prompt(&spec),
            None => {
                tracing::info!("experiment fields incomplete, using minimal prompt");
                MINIMAL_PROMPT.to_string()
            }
        }
    }

    /// Generate a webpage from a screenshot and email it.
    ///
    /// # Errors
    /// Propagates generation client errors (configuration, upstream status, transport).
    /// Normalisation and email failures never surface here.
    pub async fn generate_webpage(
        &self,
        request: &WebpageRequest,
        screenshot: &Screenshot,
    ) -> EraResult<WebpageOutcome> {
        let prompt = Self::select_prompt(request);

        let raw = self
            .generator
            .generate(&screenshot.bytes, &screenshot.mime_type, &prompt)
            .await?;
        let document = normalise(&raw, Some(&*self.generator)).await;
        tracing::info!(origin = ?document.origin(), "webpage generated");

        let email = generated_webpage_email(
            request.submitter_email(),
            self.cfg.mail().observer(),
            &prompt,
            &document,
        );
        self.deliver(email).await;

        Ok(WebpageOutcome { document, prompt })
    }

    /// Forward a shared example to the observer.
    pub async fn share_example(&self, example: SharedExample) -> EraResult<()> {
        let email = shared_example_email(
            self.cfg.mail().observer(),
            example.submitter_email.as_deref(),
            example.description.as_deref(),
            EmailAttachment {
                filename: example.filename,
                content_type: example.content_type,
                content: example.content,
            },
        );
        self.deliver(email).await;
        Ok(())
    }

    async fn deliver(&self, email: OutboundEmail) {
        let subject = email.subject.clone();
        if let Err(e) = self.mailer.send(email).await {
            tracing::error!(subject = %subject, "error sending email: {}", e);
        }
    }
}
