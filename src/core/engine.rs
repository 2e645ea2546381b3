// src/core/engine.rs
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::config::Config;
use crate::gateway::{self, GatewayClient};
use super::analyzer::{ProjectAnalyzer, ProjectReport};
use super::llm::{create_generator, DynDocumenter};

pub const README_FILE: &str = "README.md";
pub const PREVIEW_LINES: usize = 15;

/// Where a README comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationMode {
    /// Through a running gateway
    Remote { server_url: String },
    /// Straight to the backend with the local credential
    Direct,
}

/// Main orchestration engine behind the CLI commands
pub struct Engine {
    config: Config,
}

impl Engine {
    pub async fn new(config_path: Option<&Path>) -> Result<Self> {
        let mut config = Config::load_or_default(config_path)?;
        config.apply_env()?;

        debug!(
            server = %format!("{}:{}", config.server.host, config.server.port),
            provider = %config.llm.provider,
            model = %config.llm.model,
            api_key_present = config.llm.api_key.is_some(),
            "Loaded configuration"
        );

        Ok(Self::from_config(config))
    }

    pub fn from_config(config: Config) -> Self {
        Self { config }
    }

    /// Print the project report, either as a summary or as JSON
    pub async fn analyze(&self, path: PathBuf, json: bool) -> Result<()> {
        let report = ProjectAnalyzer::new(&path).analyze().await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_summary(&report);
        }

        Ok(())
    }

    /// Analyze, obtain a README and write it to disk
    pub async fn generate(
        &self,
        path: PathBuf,
        server: Option<String>,
        direct: bool,
        output: Option<PathBuf>,
    ) -> Result<()> {
        let mode = if direct {
            // fail before doing any work when the credential is missing
            self.config.require_api_key()?;
            GenerationMode::Direct
        } else {
            GenerationMode::Remote {
                server_url: server.unwrap_or_else(|| self.config.client.server_url.clone()),
            }
        };

        let analyzer = ProjectAnalyzer::new(&path);
        let report = analyzer.analyze().await?;
        print_summary(&report);

        let sample_code = analyzer.sample_code().await?;
        info!("🤖 Generating README with AI...");
        let readme = self.produce_readme(&mode, &report, &sample_code).await?;

        let target = output.unwrap_or_else(|| Path::new(&report.root_path).join(README_FILE));
        write_readme(&target, &readme).await?;

        info!("✅ README.md created successfully at: {}", target.display());
        println!("\n📄 Preview:");
        println!("{}", "─".repeat(50));
        println!("{}", preview(&readme, PREVIEW_LINES));
        println!("{}", "─".repeat(50));

        Ok(())
    }

    /// Run the gateway until shutdown
    pub async fn serve(&mut self, port: Option<u16>) -> Result<()> {
        if let Some(port) = port {
            self.config.server.port = port;
        }

        self.config.require_api_key()?;
        let generator = create_generator(&self.config.llm)?;

        gateway::serve(&self.config, generator).await?;
        Ok(())
    }

    async fn produce_readme(
        &self,
        mode: &GenerationMode,
        report: &ProjectReport,
        sample_code: &str,
    ) -> Result<String> {
        match mode {
            GenerationMode::Remote { server_url } => {
                info!("Server: {}", server_url);
                let response = GatewayClient::new(server_url)
                    .generate(report, sample_code)
                    .await?;
                Ok(response.readme)
            }
            GenerationMode::Direct => {
                let generator = create_generator(&self.config.llm)?;
                info!(
                    "Calling {} ({}) directly",
                    generator.provider_name(),
                    generator.model_name()
                );
                let documenter = DynDocumenter::new(generator);
                Ok(documenter.generate_readme(report, sample_code).await?)
            }
        }
    }
}

fn print_summary(report: &ProjectReport) {
    println!("Project:   {}", report.name);
    println!("Path:      {}", report.root_path);
    println!("✓ Found {} files", report.files.len());
    println!("✓ Detected project type: {}", report.project_type);
    println!("✓ Languages: {}", report.languages.join(", "));
    if !report.dependencies.is_empty() {
        println!("✓ Dependencies: {}", report.dependencies.len());
    }
}

/// Write the README, creating parent directories when needed
pub async fn write_readme(target: &Path, content: &str) -> Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    tokio::fs::write(target, content)
        .await
        .with_context(|| format!("Failed to write {}", target.display()))?;

    Ok(())
}

/// First `lines` lines of the document
pub fn preview(readme: &str, lines: usize) -> String {
    readme.split('\n').take(lines).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use predicates::prelude::*;

    fn engine_with_key(key: Option<&str>) -> Engine {
        let mut config = Config::default();
        config.llm.api_key = key.map(String::from);
        Engine::from_config(config)
    }

    #[test]
    fn preview_keeps_first_fifteen_lines() {
        let readme = (1..=20).map(|i| format!("line {}", i)).collect::<Vec<_>>().join("\n");
        let shown = preview(&readme, PREVIEW_LINES);

        assert_eq!(shown.lines().count(), 15);
        assert!(shown.ends_with("line 15"));
        assert_eq!(preview("short", PREVIEW_LINES), "short");
    }

    #[tokio::test]
    async fn readme_is_written_into_nested_target() {
        let temp = assert_fs::TempDir::new().unwrap();
        let target = temp.child("docs/README.md");

        write_readme(target.path(), "# Demo\n").await.unwrap();

        target.assert(predicate::str::contains("# Demo"));
    }

    #[tokio::test]
    async fn direct_mode_requires_credential_before_analysis() {
        let engine = engine_with_key(None);
        let err = engine
            .generate(PathBuf::from("/definitely/not/here"), None, true, None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("GOOGLE_GENERATIVE_AI_API_KEY"));
    }

    #[tokio::test]
    async fn serve_requires_credential() {
        let mut engine = engine_with_key(None);
        let err = engine.serve(Some(0)).await.unwrap_err();

        assert!(err.to_string().contains("environment variable is required"));
    }

    #[tokio::test]
    async fn remote_generation_writes_readme_from_gateway() {
        use crate::core::llm::TextGenerator;
        use crate::gateway::{create_router, GatewayState};
        use async_trait::async_trait;

        struct Canned;

        #[async_trait]
        impl TextGenerator for Canned {
            async fn generate(&self, _prompt: &str) -> crate::error::Result<String> {
                Ok("# Canned\n\nA project.".to_string())
            }

            fn provider_name(&self) -> &str {
                "canned"
            }

            fn model_name(&self) -> &str {
                "test"
            }
        }

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = GatewayState::new(&Config::default(), Box::new(Canned));
        tokio::spawn(async move {
            axum::serve(listener, create_router(state)).await.unwrap();
        });

        let project = assert_fs::TempDir::new().unwrap();
        project
            .child("package.json")
            .write_str(r#"{"name":"canned-app","dependencies":{"express":"^4"}}"#)
            .unwrap();
        project.child("index.js").write_str("console.log('hi')\n").unwrap();

        engine_with_key(None)
            .generate(
                project.path().to_path_buf(),
                Some(format!("http://{}", addr)),
                false,
                None,
            )
            .await
            .unwrap();

        project
            .child(README_FILE)
            .assert(predicate::str::starts_with("# Canned"));
    }
}
