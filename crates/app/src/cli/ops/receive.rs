use std::path::PathBuf;

use clap::Args;

use common::crypto::SEPARATOR;
use common::prelude::{derive_key, CodeError, CodeScheme, KdfError, SecretError};
use service::{ApiClient, ApiError};

use crate::payload::{
    FileSink, Git, GitSink, PayloadError, PayloadSink, StdoutSink, WriteMode,
};

/// Fetch a payload from the relay, destroying it there, decrypt it and apply it
#[derive(Args, Debug, Clone)]
pub struct ReceivePayload {
    /// Share code, either whole or split into words
    #[arg(required = true, num_args = 1..)]
    pub code: Vec<String>,

    /// Commit the patch with `git am` instead of applying it to the working tree
    #[arg(long, conflicts_with_all = ["output", "stdout"])]
    pub commit: bool,

    /// Repository to apply the patch to
    #[arg(long = "repo", short = 'C', default_value = ".")]
    pub repo: PathBuf,

    /// Write the payload to this file instead of applying it
    #[arg(long, short, conflicts_with = "stdout")]
    pub output: Option<PathBuf>,

    /// What to do when the output file already exists
    #[arg(long, value_enum, default_value_t = WriteMode::Create, requires = "output")]
    pub mode: WriteMode,

    /// Print the payload instead of applying it
    #[arg(long)]
    pub stdout: bool,
}

impl ReceivePayload {
    fn sink(&self) -> Box<dyn PayloadSink> {
        match (&self.output, self.stdout) {
            (Some(path), _) => Box::new(FileSink::new(path, self.mode)),
            (None, true) => Box::new(StdoutSink),
            (None, false) => Box::new(GitSink::new(Git::new(&self.repo), self.commit)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReceiveError {
    #[error(transparent)]
    Code(#[from] CodeError),
    #[error("relay request failed: {0}")]
    Api(#[from] ApiError),
    #[error("failed to derive key: {0}")]
    Kdf(#[from] KdfError),
    #[error(transparent)]
    Decrypt(#[from] SecretError),
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Reassemble a code that the shell may have split into several arguments
pub fn join_code(parts: &[String]) -> String {
    parts
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Fetch and decrypt the payload behind `code`
pub async fn fetch(
    client: &ApiClient,
    scheme: &CodeScheme,
    code: &str,
) -> Result<Vec<u8>, ReceiveError> {
    let code = scheme.parse(code)?;
    let ciphertext = client.receive(code.id()).await?;
    Ok(derive_key(code.passphrase())?.decrypt(&ciphertext)?)
}

#[async_trait::async_trait]
impl crate::cli::op::Op for ReceivePayload {
    type Error = ReceiveError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let code = join_code(&self.code);
        let scheme = CodeScheme::default();
        // a malformed code never costs the sender their upload
        scheme.parse(&code)?;

        // the relay copy is gone after the fetch, so refuse bad targets first
        let mut sink = self.sink();
        sink.prepare()?;

        let payload = fetch(&ctx.client, &scheme, &code).await?;
        tracing::debug!(bytes = payload.len(), sink = %sink.describe(), "applying payload");
        sink.apply(&payload)?;
        Ok(sink.summary(&payload))
    }
}
