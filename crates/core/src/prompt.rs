use crate::Document;

pub const DEFAULT_INSTRUCTION: &str = "Given these documents, answer the question.";

/// Renders retrieved documents and the question into the answering prompt.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    instruction: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_INSTRUCTION)
    }
}

impl PromptBuilder {
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
        }
    }

    pub fn build(&self, documents: &[Document], question: &str) -> String {
        let mut prompt = String::new();
        prompt.push_str(&self.instruction);
        prompt.push_str("\nDocuments:\n");
        for document in documents {
            prompt.push_str(document.content.trim());
            prompt.push('\n');
        }
        prompt.push_str("Question: ");
        prompt.push_str(question);
        prompt.push_str("\nAnswer:");
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_are_listed_one_per_line_before_the_question() {
        let documents = vec![
            Document::from_text("Paris is the capital of France."),
            Document::from_text("France is in Europe."),
        ];
        let prompt = PromptBuilder::default().build(&documents, "capital of France");

        assert_eq!(
            prompt,
            "Given these documents, answer the question.\n\
             Documents:\n\
             Paris is the capital of France.\n\
             France is in Europe.\n\
             Question: capital of France\n\
             Answer:"
        );
    }

    #[test]
    fn empty_retrieval_still_asks_the_question() {
        let prompt = PromptBuilder::default().build(&[], "why is the sky blue?");
        assert!(prompt.contains("Documents:\nQuestion: why is the sky blue?\nAnswer:"));
    }
}
