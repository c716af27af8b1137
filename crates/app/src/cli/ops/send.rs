use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use common::prelude::{derive_key, Code, CodeError, CodeScheme, KdfError, SecretError};
use service::units::parse_duration;
use service::{ApiClient, ApiError, ErrorKind};

use crate::payload::{
    FileSource, Git, GitSelection, GitSource, PayloadError, PayloadSource, StdinSource,
};

/// Fresh codes tried before giving up on id collisions
const MAX_ATTEMPTS: usize = 3;

/// Encrypt changes and leave them on the relay for one receiver
#[derive(Args, Debug, Clone)]
pub struct SendPayload {
    /// Commit (`abc123`, `HEAD`) or range (`HEAD~3..`, `main..feature`) to send as patches
    pub revision: Option<String>,

    /// Send staged changes instead of the working tree
    #[arg(long, conflicts_with = "revision")]
    pub staged: bool,

    /// Repository to collect changes from
    #[arg(long = "repo", short = 'C', default_value = ".")]
    pub repo: PathBuf,

    /// Send this file instead of git changes
    #[arg(long, short, conflicts_with_all = ["revision", "staged", "stdin"])]
    pub input: Option<PathBuf>,

    /// Send whatever arrives on stdin instead of git changes
    #[arg(long, conflicts_with_all = ["revision", "staged"])]
    pub stdin: bool,

    /// How long the relay keeps the payload, capped by the relay
    #[arg(long, value_parser = parse_duration, default_value = "1h")]
    pub ttl: Duration,
}

impl SendPayload {
    fn source(&self) -> Box<dyn PayloadSource> {
        if let Some(path) = &self.input {
            return Box::new(FileSource::new(path));
        }
        if self.stdin {
            return Box::new(StdinSource);
        }
        let selection = match (&self.revision, self.staged) {
            (Some(revision), _) => GitSelection::Revision(revision.clone()),
            (None, true) => GitSelection::Staged,
            (None, false) => GitSelection::WorkingTree,
        };
        Box::new(GitSource::new(Git::new(&self.repo), selection))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("failed to generate a share code: {0}")]
    Code(#[from] CodeError),
    #[error("failed to derive key: {0}")]
    Kdf(#[from] KdfError),
    #[error("failed to encrypt payload: {0}")]
    Encrypt(#[from] SecretError),
    #[error("relay request failed: {0}")]
    Api(#[from] ApiError),
}

/// A payload that made it to the relay
#[derive(Debug)]
pub struct Shared {
    pub code: Code,
    pub expiry: OffsetDateTime,
}

/// Generate a code, encrypt under it and upload, retrying on code id collisions
pub async fn share(
    client: &ApiClient,
    scheme: &CodeScheme,
    payload: &[u8],
    ttl: Duration,
) -> Result<Shared, SendError> {
    let mut attempt = 1;
    loop {
        let code = scheme.generate()?;
        let ciphertext = derive_key(code.passphrase())?.encrypt(payload)?;

        match client.send(code.id(), &ciphertext, ttl).await {
            Ok(expiry) => return Ok(Shared { code, expiry }),
            Err(e) if e.kind() == Some(ErrorKind::Conflict) && attempt < MAX_ATTEMPTS => {
                tracing::debug!(attempt, "code id already taken, trying a new code");
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for SendPayload {
    type Error = SendError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let payload = self.source().read_payload()?;
        if payload.is_empty() {
            return Err(PayloadError::Empty.into());
        }
        tracing::debug!(bytes = payload.len(), "encrypting and uploading");

        let shared = share(&ctx.client, &CodeScheme::default(), &payload, self.ttl).await?;
        let expiry = shared
            .expiry
            .format(&Rfc3339)
            .unwrap_or_else(|_| shared.expiry.to_string());

        let mut output = format!(
            "Share code: {code}\n\
             Expires:    {expiry}\n\
             \n\
             The code works once. On the receiving side run:\n  \
             git-share receive {code}",
            code = shared.code,
        );
        if self.revision.is_some() && self.input.is_none() && !self.stdin {
            output.push_str(&format!(
                "\nor, to receive as commits instead of a patch:\n  \
                 git-share receive {} --commit",
                shared.code
            ));
        }
        Ok(output)
    }
}
