use super::scanner::FileDescriptor;

/// Extension to display label
const LANGUAGE_TABLE: &[(&str, &str)] = &[
    (".js", "JavaScript"),
    (".ts", "TypeScript"),
    (".jsx", "JavaScript/React"),
    (".tsx", "TypeScript/React"),
    (".py", "Python"),
    (".java", "Java"),
    (".go", "Go"),
    (".rs", "Rust"),
    (".rb", "Ruby"),
    (".php", "PHP"),
    (".cs", "C#"),
    (".cpp", "C++"),
    (".c", "C"),
];

pub struct LanguageClassifier;

impl LanguageClassifier {
    pub fn label_for(extension: &str) -> Option<&'static str> {
        LANGUAGE_TABLE
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, label)| *label)
    }

    /// Distinct language labels in first-seen order. Unmapped extensions are skipped.
    pub fn classify(files: &[FileDescriptor]) -> Vec<String> {
        let mut languages: Vec<String> = Vec::new();
        for label in files.iter().filter_map(|f| Self::label_for(&f.extension)) {
            if !languages.iter().any(|seen| seen == label) {
                languages.push(label.to_string());
            }
        }
        languages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(path: &str, extension: &str) -> FileDescriptor {
        FileDescriptor {
            relative_path: path.to_string(),
            extension: extension.to_string(),
            size_bytes: 1,
        }
    }

    #[test]
    fn labels_are_unique_and_keep_first_seen_order() {
        let files = vec![
            file("b.tsx", ".tsx"),
            file("a.py", ".py"),
            file("c.tsx", ".tsx"),
            file("README.md", ".md"),
            file("d.ts", ".ts"),
        ];

        assert_eq!(
            LanguageClassifier::classify(&files),
            vec!["TypeScript/React", "Python", "TypeScript"]
        );
    }

    #[test]
    fn unknown_extensions_are_ignored() {
        assert_eq!(LanguageClassifier::label_for(".md"), None);
        assert_eq!(LanguageClassifier::label_for(""), None);
        assert!(LanguageClassifier::classify(&[file("index.html", ".html")]).is_empty());
    }
}
