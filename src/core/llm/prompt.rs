use super::super::ProjectReport;

pub const MAX_PROMPT_DEPENDENCIES: usize = 20;
pub const MAX_PROMPT_SAMPLE_CHARS: usize = 2000;

/// Builds the README-writing instruction sent to the generation backend
pub struct PromptBuilder {
    max_dependencies: usize,
    max_sample_chars: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            max_dependencies: MAX_PROMPT_DEPENDENCIES,
            max_sample_chars: MAX_PROMPT_SAMPLE_CHARS,
        }
    }
}

impl PromptBuilder {
    pub fn build(&self, report: &ProjectReport, sample_code: &str) -> String {
        let mut prompt = String::new();

        prompt.push_str("You are an expert technical writer. Analyze the following project information and generate a comprehensive, professional README.md file.\n\n");

        prompt.push_str("PROJECT INFORMATION:\n");
        prompt.push_str(&format!("- Project Name: {}\n", report.name));
        prompt.push_str(&format!("- Project Type: {}\n", report.project_type));
        prompt.push_str(&format!("- Languages: {}\n", report.languages.join(", ")));
        prompt.push_str(&format!(
            "- Dependencies: {}\n\n",
            report
                .dependencies
                .iter()
                .take(self.max_dependencies)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        ));

        prompt.push_str("PROJECT STRUCTURE:\n");
        prompt.push_str(&report.structure_listing);
        prompt.push_str("\n\n");

        prompt.push_str("SAMPLE CODE:\n");
        prompt.push_str(&truncate_chars(sample_code, self.max_sample_chars));
        prompt.push_str("\n\n");

        prompt.push_str("REQUIREMENTS:\n");
        prompt.push_str("Create a comprehensive README.md that includes:\n\n");
        prompt.push_str("1. **Project Title and Description**: A clear, concise description of what the project does\n");
        prompt.push_str("2. **Features**: Key features and capabilities (use bullet points)\n");
        prompt.push_str("3. **Tech Stack**: Technologies and frameworks used\n");
        prompt.push_str("4. **Installation**: Step-by-step installation instructions\n");
        prompt.push_str("5. **Usage**: How to use the project with examples\n");
        prompt.push_str("6. **Project Structure**: Brief overview of the folder structure\n");
        prompt.push_str("7. **Configuration**: Any environment variables or configuration needed\n");
        prompt.push_str("8. **Contributing**: Guidelines for contributing (if applicable)\n");
        prompt.push_str("9. **License**: License information\n\n");

        prompt.push_str("STYLE GUIDELINES:\n");
        prompt.push_str("- Use proper Markdown formatting\n");
        prompt.push_str("- Include code blocks with syntax highlighting where appropriate\n");
        prompt.push_str("- Use emojis sparingly and professionally (e.g., 🚀, ⚡, 📦)\n");
        prompt.push_str("- Be clear and concise\n");
        prompt.push_str("- Use badges if appropriate (build status, version, etc.)\n");
        prompt.push_str("- Make it beginner-friendly but professional\n\n");

        prompt.push_str("Generate ONLY the README.md content without any additional commentary or explanations. Start directly with the README content.");

        prompt
    }
}

/// Char-boundary safe prefix
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
