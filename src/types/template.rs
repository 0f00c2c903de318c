//! Prompt templates rendered with Tera.

use std::collections::HashMap;
use std::error::Error as _;

use tera::{Context, Tera};

use crate::Error;

const TEMPLATE_NAME: &str = "prompt";

/// A prompt template with declared input variables, e.g.
/// `"Answer concisely: {{ question }}"`.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    tera: Tera,
    input_variables: Vec<String>,
}

impl PromptTemplate {
    /// Compile `template`. Fails on Tera syntax errors.
    pub fn new<I, S>(input_variables: I, template: &str) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, template)
            .map_err(|e| Error::config(format!("invalid prompt template: {}", describe(&e))))?;

        Ok(Self {
            tera,
            input_variables: input_variables.into_iter().map(Into::into).collect(),
        })
    }

    pub fn input_variables(&self) -> Vec<&str> {
        self.input_variables.iter().map(String::as_str).collect()
    }

    /// Render the template. Every declared variable must have a value.
    pub fn render(&self, vars: &HashMap<&str, &str>) -> Result<String, Error> {
        if let Some(missing) = self
            .input_variables
            .iter()
            .find(|name| !vars.contains_key(name.as_str()))
        {
            return Err(Error::config(format!("missing template variable '{missing}'")));
        }

        let context = Context::from_serialize(vars)
            .map_err(|e| Error::config(format!("invalid template variables: {}", describe(&e))))?;
        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|e| Error::config(format!("failed to render prompt: {}", describe(&e))))
    }
}

// Tera keeps the useful detail in the error source chain
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_question_template() {
        let template =
            PromptTemplate::new(["question"], "Answer concisely: {{ question }}").unwrap();
        assert_eq!(template.input_variables(), vec!["question"]);

        let vars = HashMap::from([("question", "What is the capital of France?")]);
        assert_eq!(
            template.render(&vars).unwrap(),
            "Answer concisely: What is the capital of France?"
        );
    }

    #[test]
    fn test_repeated_variables() {
        let template = PromptTemplate::new(["a", "b"], "{{ a }} {{ b }} {{ a }}").unwrap();
        let vars = HashMap::from([("a", "x"), ("b", "y")]);
        assert_eq!(template.render(&vars).unwrap(), "x y x");
    }

    #[test]
    fn test_missing_variable_fails() {
        let template = PromptTemplate::new(["name"], "Hello {{ name }}").unwrap();
        let err = template.render(&HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("missing template variable 'name'"));
    }

    #[test]
    fn test_undeclared_variable_fails_at_render() {
        let template = PromptTemplate::new(Vec::<String>::new(), "Hello {{ name }}").unwrap();
        let err = template.render(&HashMap::new()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_malformed_templates_rejected() {
        for source in ["Hello {{ name", "Hello {% if %}", "{{ }}"] {
            let err = PromptTemplate::new(["name"], source).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "expected Config error for {source:?}");
        }
    }
}
