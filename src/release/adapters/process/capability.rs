//! Platform capability driven by configured vendor CLI templates.

use async_trait::async_trait;
use minijinja::{Environment, Value, context};
use std::sync::Arc;

use super::{ShellCommandRunner, quote};
use crate::config::PlatformCommandConfig;
use crate::release::ports::{
    CapabilityError, CapabilityResult, CommandRunner, PlatformCapability, PreviewRequest,
    UploadRequest,
};

/// Renders the platform's upload and preview templates and runs them in
/// the project directory.
///
/// The upload command must print the QR code URL as its last non-empty
/// line of standard output.
#[derive(Debug, Clone)]
pub struct CommandCapability<R = ShellCommandRunner>
where
    R: CommandRunner,
{
    runner: Arc<R>,
    commands: PlatformCommandConfig,
}

impl<R> CommandCapability<R>
where
    R: CommandRunner,
{
    /// Creates a capability for one platform's command templates.
    #[must_use]
    pub const fn new(runner: Arc<R>, commands: PlatformCommandConfig) -> Self {
        Self { runner, commands }
    }
}

fn render(template: &str, values: Value) -> CapabilityResult<String> {
    Environment::new()
        .render_str(template, values)
        .map_err(|err| CapabilityError::Template(err.to_string()))
}

fn quote_optional(value: Option<&str>) -> Option<String> {
    value.map(quote)
}

#[async_trait]
impl<R> PlatformCapability for CommandCapability<R>
where
    R: CommandRunner,
{
    async fn upload(&self, request: &UploadRequest) -> CapabilityResult<String> {
        let command = render(
            &self.commands.upload_command,
            context! {
                platform_type => quote(request.platform_type.as_str()),
                project_path => quote(request.project_path.as_str()),
                version => quote(request.version.as_str()),
                description => quote(&request.description),
                identification => quote_optional(request.identification.as_deref()),
                experience => request.experience,
            },
        )?;
        let output = self.runner.run(&command, &request.project_path).await?;
        output
            .last_stdout_line()
            .map(str::to_owned)
            .ok_or_else(|| CapabilityError::Rejected("upload printed no QR code URL".to_owned()))
    }

    async fn preview(&self, request: &PreviewRequest) -> CapabilityResult<()> {
        let command = render(
            &self.commands.preview_command,
            context! {
                platform_type => quote(request.platform_type.as_str()),
                project_path => quote(request.project_path.as_str()),
                version => quote(request.version.as_str()),
                qr_code_path => quote(request.qr_code_path().as_str()),
                page_path => quote_optional(request.page_path.as_deref()),
                search_query => quote_optional(request.search_query.as_deref()),
                scene => quote_optional(request.scene.as_deref()),
            },
        )?;
        self.runner.run(&command, &request.project_path).await?;
        Ok(())
    }
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]
mod tests {
    use super::CommandCapability;
    use crate::config::PlatformCommandConfig;
    use crate::release::domain::{PlatformType, VersionLabel};
    use crate::release::ports::{
        CapabilityError, CommandOutput, MockCommandRunner, PlatformCapability, UploadRequest,
    };
    use camino::Utf8PathBuf;
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    #[fixture]
    fn upload_request() -> UploadRequest {
        UploadRequest {
            platform_type: PlatformType::new("wechat-mini").expect("valid platform type"),
            project_path: Utf8PathBuf::from("/srv/miniprogram/wechat-mini/1.0"),
            version: VersionLabel::new("1.0").expect("valid version"),
            description: "spring sale".to_owned(),
            identification: None,
            experience: true,
        }
    }

    fn commands(upload: &str) -> PlatformCommandConfig {
        PlatformCommandConfig {
            upload_command: upload.to_owned(),
            preview_command: "true".to_owned(),
        }
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn upload_renders_quoted_values_and_returns_last_line(upload_request: UploadRequest) {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|command, _| {
                command == "ci upload --pp '/srv/miniprogram/wechat-mini/1.0' -v '1.0' -d 'spring sale' --experience"
            })
            .times(1)
            .returning(|_, _| {
                Ok(CommandOutput {
                    stdout: "uploading\nhttps://qr.example/abc\n\n".to_owned(),
                    stderr: String::new(),
                })
            });
        let capability = CommandCapability::new(
            Arc::new(runner),
            commands(
                "ci upload --pp {{ project_path }} -v {{ version }} -d {{ description }}\
                 {% if identification %} -r {{ identification }}{% endif %}\
                 {% if experience %} --experience{% endif %}",
            ),
        );

        let url = capability
            .upload(&upload_request)
            .await
            .expect("upload should succeed");

        assert_eq!(url, "https://qr.example/abc");
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn upload_without_output_is_rejected(upload_request: UploadRequest) {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|command, _| command == "ci upload")
            .returning(|_, _| Ok(CommandOutput::default()));
        let capability = CommandCapability::new(Arc::new(runner), commands("ci upload"));

        let err = capability
            .upload(&upload_request)
            .await
            .expect_err("empty output should be rejected");

        assert!(matches!(err, CapabilityError::Rejected(_)));
    }
}
