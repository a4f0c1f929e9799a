//! Source fetcher that shells out to git or curl.

use async_trait::async_trait;
use camino::Utf8Path;
use std::sync::Arc;

use super::{ShellCommandRunner, quote};
use crate::release::{
    domain::SourceLocator,
    ports::{CommandRunner, SourceFetchResult, SourceFetcher},
};

const ARCHIVE_FILE_NAME: &str = "source.tar.gz";

/// Fetches git sources with a shallow clone and archives with `curl`.
#[derive(Debug, Clone)]
pub struct ProcessSourceFetcher<R = ShellCommandRunner>
where
    R: CommandRunner,
{
    runner: Arc<R>,
}

impl<R> ProcessSourceFetcher<R>
where
    R: CommandRunner,
{
    /// Creates a fetcher that runs its transfers through `runner`.
    #[must_use]
    pub const fn new(runner: Arc<R>) -> Self {
        Self { runner }
    }
}

/// Environment variable carrying the archive access token.
const PRIVATE_TOKEN_VAR: &str = "MINISHIP_PRIVATE_TOKEN";

/// Shell command and environment that transfer a source into the
/// current directory.
#[derive(Debug, PartialEq, Eq)]
struct Transfer {
    command: String,
    env: Vec<(String, String)>,
}

/// Builds the transfer for `locator`.
///
/// Archive tokens are expanded by the shell from [`PRIVATE_TOKEN_VAR`], so
/// the command text itself never holds the secret.
fn transfer(locator: &SourceLocator) -> Transfer {
    match locator {
        SourceLocator::Git { repository, branch } => Transfer {
            command: format!(
                "git clone --quiet --depth 1 --branch {} {} .",
                quote(branch),
                quote(repository)
            ),
            env: Vec::new(),
        },
        SourceLocator::Archive {
            endpoint,
            private_token,
            ref_param,
        } => {
            let url = format!(
                "{}\"${{{PRIVATE_TOKEN_VAR}}}\"{}",
                quote(&format!("{endpoint}private_token=")),
                quote(&format!("&{ref_param}"))
            );
            Transfer {
                command: format!(
                    "curl --fail --silent --show-error --location --output {archive} {url} \
                     && tar -xzf {archive} --strip-components=1 \
                     && rm -f {archive}",
                    archive = ARCHIVE_FILE_NAME
                ),
                env: vec![(PRIVATE_TOKEN_VAR.to_owned(), private_token.clone())],
            }
        }
    }
}

#[async_trait]
impl<R> SourceFetcher for ProcessSourceFetcher<R>
where
    R: CommandRunner,
{
    async fn fetch(
        &self,
        locator: &SourceLocator,
        destination: &Utf8Path,
    ) -> SourceFetchResult<()> {
        let Transfer { command, env } = transfer(locator);
        self.runner
            .run_with_env(&command, destination, &env)
            .await?;
        Ok(())
    }
}
