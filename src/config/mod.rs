//! Vendor configuration
//!
//! Each vendor owns a [`VendorConfig`]: a display label, an environment
//! variable prefix derived from it, and the setup questions the vendor asks.
//! Answers are persisted as `PREFIX_QUESTION=value` lines in an env file
//! (see [`settings`]).

pub mod settings;

pub use self::settings::{default_env_file_path, load_env_file, save_env_file};

/// Derive an environment variable prefix from a display label
///
/// `"LM Studio"` becomes `"LM_STUDIO"`.
#[must_use]
pub fn build_env_variable_prefix(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// A single configurable value of a vendor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupQuestion {
    /// Human readable name, e.g. "API Base URL"
    pub name: String,

    /// Environment variable holding the answer
    pub env_variable: String,

    /// Whether the vendor is unusable without an answer
    pub required: bool,

    /// Current answer
    pub value: String,
}

impl SetupQuestion {
    fn new(env_prefix: &str, name: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            env_variable: format!("{env_prefix}_{}", build_env_variable_prefix(name)),
            required,
            value: String::new(),
        }
    }

    /// Whether the question has a non-empty answer
    #[must_use]
    pub fn is_answered(&self) -> bool {
        !self.value.is_empty()
    }

    /// Take the answer from the environment when it is set and non-empty
    ///
    /// Returns true if the value changed.
    pub fn apply_env(&mut self) -> bool {
        match std::env::var(&self.env_variable) {
            Ok(value) if !value.is_empty() && value != self.value => {
                self.value = value;
                true
            }
            _ => false,
        }
    }

    /// `ENV_VARIABLE=value` line, newline terminated
    #[must_use]
    pub fn env_line(&self) -> String {
        format!("{}={}\n", self.env_variable, self.value)
    }
}

/// Configuration shared by every vendor adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorConfig {
    label: String,
    env_prefix: String,
    questions: Vec<SetupQuestion>,
}

impl VendorConfig {
    /// Create a configuration for the vendor named `label`
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let env_prefix = build_env_variable_prefix(&label);
        Self {
            label,
            env_prefix,
            questions: Vec::new(),
        }
    }

    /// Display label
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Register a setup question and return its index
    pub fn add_setup_question(&mut self, name: &str, required: bool) -> usize {
        self.questions
            .push(SetupQuestion::new(&self.env_prefix, name, required));
        self.questions.len() - 1
    }

    /// Question at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` was not returned by [`Self::add_setup_question`].
    #[must_use]
    pub fn question(&self, index: usize) -> &SetupQuestion {
        &self.questions[index]
    }

    /// Mutable question at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` was not returned by [`Self::add_setup_question`].
    pub fn question_mut(&mut self, index: usize) -> &mut SetupQuestion {
        &mut self.questions[index]
    }

    /// Override answers from the process environment
    ///
    /// Returns the number of answers that changed.
    pub fn apply_env(&mut self) -> usize {
        self.questions
            .iter_mut()
            .map(SetupQuestion::apply_env)
            .filter(|changed| *changed)
            .count()
    }

    /// Append one `ENV=value` line per question
    pub fn fill_env_file_content(&self, buffer: &mut String) {
        for question in &self.questions {
            buffer.push_str(&question.env_line());
        }
    }
}
