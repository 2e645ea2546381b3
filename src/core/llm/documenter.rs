use async_trait::async_trait;

use crate::error::Result;
use super::super::ProjectReport;
use super::prompt::PromptBuilder;

/// A text-generation backend: one prompt in, one document out
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for the prompt. Failures are returned, never retried.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get the provider name (e.g., "Google Gemini")
    fn provider_name(&self) -> &str;

    /// Get the model name being used
    fn model_name(&self) -> &str;
}

/// Turns a project report plus sample code into a README via a generator
pub struct ReadmeDocumenter<G: ?Sized> {
    prompt_builder: PromptBuilder,
    generator: Box<G>,
}

impl<G: TextGenerator + ?Sized> ReadmeDocumenter<G> {
    pub fn new(generator: Box<G>) -> Self {
        Self {
            prompt_builder: PromptBuilder::default(),
            generator,
        }
    }

    #[cfg(test)]
    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub async fn generate_readme(&self, report: &ProjectReport, sample_code: &str) -> Result<String> {
        let prompt = self.prompt_builder.build(report, sample_code);
        self.generator.generate(&prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ProjectType;
    use std::sync::Mutex;

    struct RecordingGenerator {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        async fn generate(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("# Generated".to_string())
        }

        fn provider_name(&self) -> &str {
            "recording"
        }

        fn model_name(&self) -> &str {
            "test"
        }
    }

    #[tokio::test]
    async fn prompt_reaches_the_generator() {
        let documenter = ReadmeDocumenter::new(Box::new(RecordingGenerator {
            prompts: Mutex::new(Vec::new()),
        }));
        let report = ProjectReport {
            name: "demo".to_string(),
            root_path: "/tmp/demo".to_string(),
            project_type: ProjectType::Python,
            languages: vec!["Python".to_string()],
            dependencies: vec!["flask".to_string()],
            files: vec![],
            structure_listing: "app.py".to_string(),
        };

        let readme = documenter.generate_readme(&report, "print('x')").await.unwrap();

        assert_eq!(readme, "# Generated");
        let prompts = documenter.generator().prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("- Project Name: demo"));
        assert!(prompts[0].contains("print('x')"));
    }
}
