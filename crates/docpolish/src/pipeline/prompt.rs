//! Prompt construction for the documentation rewrite.

const PROMPT_HEADER: &str = "\
Transform the following documentation into Google Cloud Platform (GCP) style documentation.

GCP Documentation Style Guidelines:
1. Use clear, concise language
2. Structure with proper headings and subheadings
3. Include code examples with syntax highlighting
4. Add step-by-step instructions where appropriate
5. Use consistent formatting and spacing
6. Include relevant links and references
7. Make it scannable with bullet points and numbered lists
8. Use professional, technical tone
9. Include prerequisites and requirements sections
10. Add troubleshooting sections when relevant

Original Documentation:
";

const PROMPT_FOOTER: &str = "

Please transform this into clean, professional GCP-style documentation:
";

/// Builds the rewrite prompt. The same text always yields the same prompt.
pub fn build_prompt(text: &str) -> String {
    let mut prompt = String::with_capacity(PROMPT_HEADER.len() + text.len() + PROMPT_FOOTER.len());
    prompt.push_str(PROMPT_HEADER);
    prompt.push_str(text);
    prompt.push_str(PROMPT_FOOTER);
    prompt
}

/// Character count of the prompt [`build_prompt`] would produce.
pub fn prompt_len(text: &str) -> usize {
    PROMPT_HEADER.chars().count() + text.chars().count() + PROMPT_FOOTER.chars().count()
}
