//! changelog::render
//!
//! Template rendering of a collected changelog.
//!
//! # Design
//!
//! Optional keys of [`TemplateContext`] are `Option`s that are left out of
//! the serialized context when `None`, so templates test for presence.
//! Items labelled [`SKIP_LABEL`] are removed before the engine runs, and a
//! list that ends up empty is removed with them. Templates use Jinja syntax
//! (minijinja) with `trim_blocks` enabled.

use minijinja::Environment;
use serde::Serialize;
use thiserror::Error;

use super::format::{IssueView, PullView};

/// Items carrying this label never appear in a changelog.
pub const SKIP_LABEL: &str = "changelog-skip";

/// The built-in changelog template.
///
/// Each optional section opens with its own blank-line separator and ends
/// without a newline, so an absent section leaves nothing behind.
pub const DEFAULT_TEMPLATE: &str = r#"## {{ package }} {{ version }}

{% if previous_release %}
[Diff since {{ previous_release }}]({{ compare_url }})
{%- else %}
[Initial release]({{ version_url }})
{%- endif %}
{% if custom %}


{{ custom }}
{%- endif %}
{% if issues %}


**Closed issues:**
{%- for issue in issues %}

- {{ issue.title }} (#{{ issue.number }})
{%- endfor %}
{% endif %}
{% if pulls %}


**Merged pull requests:**
{%- for pull in pulls %}

- {{ pull.title }} (#{{ pull.number }}) (@{{ pull.author.username }})
{%- endfor %}
{% endif %}
"#;

const TEMPLATE_NAME: &str = "changelog";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Everything a changelog template can refer to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateContext {
    pub package: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_release: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compare_url: Option<String>,
    pub version_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<IssueView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pulls: Option<Vec<PullView>>,
}

impl TemplateContext {
    /// A copy with skip-labelled items removed and empty lists dropped.
    pub fn without_skipped(&self) -> Self {
        Self {
            issues: visible(self.issues.as_deref()),
            pulls: visible(self.pulls.as_deref()),
            ..self.clone()
        }
    }
}

trait Labelled {
    fn labels(&self) -> &[String];

    fn skipped(&self) -> bool {
        self.labels().iter().any(|l| l == SKIP_LABEL)
    }
}

impl Labelled for IssueView {
    fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl Labelled for PullView {
    fn labels(&self) -> &[String] {
        &self.labels
    }
}

fn visible<T: Labelled + Clone>(items: Option<&[T]>) -> Option<Vec<T>> {
    let kept: Vec<T> = items?.iter().filter(|i| !i.skipped()).cloned().collect();
    (!kept.is_empty()).then_some(kept)
}

/// Renders a [`TemplateContext`] through one template.
#[derive(Debug, Clone)]
pub struct Renderer {
    template: String,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl Renderer {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Render `context`.
    ///
    /// The output is returned exactly as the template produced it.
    ///
    /// # Example
    ///
    /// ```
    /// use tagnotes::changelog::render::{Renderer, TemplateContext};
    ///
    /// let context = TemplateContext {
    ///     version: "v1.2.3".to_string(),
    ///     ..Default::default()
    /// };
    /// let text = Renderer::new("{{ version }}").render(&context).unwrap();
    /// assert_eq!(text, "v1.2.3");
    /// ```
    pub fn render(&self, context: &TemplateContext) -> Result<String, RenderError> {
        let context = context.without_skipped();

        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.add_template(TEMPLATE_NAME, &self.template)?;
        let rendered = env.get_template(TEMPLATE_NAME)?.render(&context)?;

        Ok(rendered)
    }
}
