//! Template-based article generator.

use std::path::PathBuf;

use log::info;

use super::model::{find_model, model_file_name, ModelStatus};
use super::{ContentGenerator, GenerateError};

const ENHANCED_TEMPLATE: &str = "## OUTLINE
- Introduction to {topic}
- Core concepts and fundamentals
- Practical applications and use cases
- Benefits and advantages
- Implementation strategies
- Future outlook and trends
- Conclusion and key takeaways

## ARTICLE

# Understanding {topic}: A Comprehensive Guide

{topic} represents a significant area of interest in today's rapidly evolving landscape. This guide explores the essential aspects, practical applications, and future implications of {topic}.

## Core Concepts and Fundamentals

At its foundation, {topic} encompasses several key principles that form the backbone of understanding. These concepts provide the framework for deeper exploration and practical application.

The primary elements include:
- Theoretical foundations and underlying principles
- Historical context and evolution
- Current state and recent developments
- Key terminology and definitions

## Practical Applications and Use Cases

{topic} finds application across numerous domains and industries. Real-world implementations demonstrate its versatility in solving complex challenges.

## Benefits and Advantages

**Efficiency**: Streamlined processes and reduced complexity lead to significant gains.

**Scalability**: Solutions built around {topic} principles typically scale well.

**Innovation**: Opens new avenues for creative problem-solving.

## Implementation Strategies

1. **Assessment**: Evaluate the current state and identify opportunities
2. **Planning**: Develop an implementation roadmap
3. **Execution**: Deploy with proper monitoring
4. **Optimization**: Refine continuously

## Future Outlook and Trends

The future of {topic} looks promising, with technological advances, wider adoption and integration with complementary technologies.

## Conclusion and Key Takeaways

{topic} is a valuable domain with significant potential. Understanding its principles, applications and implementation strategies is key to leveraging it.

*Generated using enhanced content generation with local model: {model}*";

const FALLBACK_TEMPLATE: &str = "## OUTLINE
- Introduction to {topic}
- Key aspects and importance
- Practical applications
- Benefits and considerations
- Conclusion and next steps

## ARTICLE

# Understanding {topic}

{topic} is an important subject that deserves our attention and understanding. In today's rapidly evolving world, knowledge about {topic} can provide significant advantages and insights.

## Key Aspects

When exploring {topic}, several key aspects emerge that are worth considering. These elements form the foundation of our understanding.

## Practical Applications

The practical applications of {topic} are numerous and varied. From everyday situations to professional environments, its principles can be applied in meaningful ways.

## Benefits and Considerations

Understanding {topic} improves decision-making and problem-solving. It is also important to consider potential challenges and limitations.

## Conclusion

{topic} represents a valuable area of knowledge. By continuing to explore and learn about {topic}, we can develop a more comprehensive perspective.

*Generated using fallback content generation*";

/// Renders article templates for a topic.
///
/// The model directories are scanned once, at construction. Generation never
/// fails and never returns empty text.
#[derive(Debug, Clone)]
pub struct TemplateGenerator {
    model_path: Option<PathBuf>,
}

impl TemplateGenerator {
    /// Scans `model_directories` for a local model file.
    pub fn discover(model_directories: &[PathBuf]) -> Self {
        let model_path = find_model(model_directories);
        match &model_path {
            Some(path) => info!("Local model detected: {}", path.display()),
            None => info!("No local model found - using fallback generation"),
        }
        Self { model_path }
    }

    /// Generator that always uses the fallback template.
    pub fn fallback() -> Self {
        Self { model_path: None }
    }

    pub fn with_model(model_path: PathBuf) -> Self {
        Self {
            model_path: Some(model_path),
        }
    }

    pub fn model_path(&self) -> Option<&PathBuf> {
        self.model_path.as_ref()
    }

    fn render(&self, topic: &str) -> String {
        let name = self.model_path.as_deref().and_then(model_file_name);
        match name {
            Some(model) => fill(ENHANCED_TEMPLATE, topic, &model),
            None => fill(FALLBACK_TEMPLATE, topic, ""),
        }
    }
}

/// Substitutes `{topic}` and `{model}` in a single left-to-right pass, so
/// placeholder text inside the substituted values is kept verbatim.
fn fill(template: &str, topic: &str, model: &str) -> String {
    let mut out = String::with_capacity(template.len() + topic.len() * 8);
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        rest = if let Some(after) = tail.strip_prefix("{topic}") {
            out.push_str(topic);
            after
        } else if let Some(after) = tail.strip_prefix("{model}") {
            out.push_str(model);
            after
        } else {
            out.push('{');
            &tail[1..]
        };
    }

    out.push_str(rest);
    out
}

impl ContentGenerator for TemplateGenerator {
    fn generate(&self, topic: &str) -> Result<String, GenerateError> {
        Ok(self.render(topic))
    }

    fn model_status(&self) -> ModelStatus {
        ModelStatus::from_model_path(self.model_path.as_deref())
    }
}
