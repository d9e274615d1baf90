//! Request composition: turns a mode plus its inputs into the single
//! outbound generation payload.
//!
//! The instructional text sent upstream is never the user's raw instruction;
//! it is synthesized by template because the remote model follows literal,
//! explicit text more reliably than short hints.

use crate::api::EditImageRequest;
use crate::models::{GenerationMode, GenerationRequest};
use crate::prompts;
use crate::{Error, Result};

/// Default and maximum number of variations requested per call.
pub const DEFAULT_VARIATION_COUNT: u8 = 3;
/// Combined mode always requests exactly this many variations.
pub const COMBINED_VARIATION_COUNT: u8 = 3;

/// Literal pair sniffed in edit instructions to switch to the selective
/// text-removal template. A heuristic, not a parser.
const TEXT_TOKEN: &str = "text";
const REMOVAL_TOKEN: &str = "remove";

/// Fixed lead-in fed to the text-removal template in combined mode, where no
/// user instruction drives the removal itself.
const COMBINED_LEAD_IN: &str = "Remove the overlaid text from this product image.";

/// A validated, mode-shaped generation plan.
///
/// One variant per mode keeps the template-selection rules auditable and
/// independently testable instead of burying them in nested conditionals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposePlan {
    Edit {
        image: String,
        instruction: String,
        count: u8,
    },
    Generate {
        description: String,
        count: u8,
    },
    TextOnly {
        image: String,
    },
    Combined {
        image: String,
        background: Option<String>,
    },
}

impl ComposePlan {
    /// Validate a loose inbound request into a typed plan.
    ///
    /// Checks the per-mode required-input table before any payload
    /// construction; failures are reported without a network call.
    pub fn from_request(request: &EditImageRequest) -> Result<Self> {
        match request.mode {
            GenerationMode::Edit => {
                let image = require(&request.image, "an image and an edit instruction are required")?;
                let instruction =
                    require(&request.prompt, "an image and an edit instruction are required")?;
                Ok(ComposePlan::Edit {
                    image,
                    instruction,
                    count: clamp_count(request.image_count),
                })
            }
            GenerationMode::Generate => {
                let description = require(
                    &request.text_prompt,
                    "a description of the image to generate is required",
                )?;
                Ok(ComposePlan::Generate {
                    description,
                    count: clamp_count(request.image_count),
                })
            }
            GenerationMode::TextOnly => {
                let image = require(&request.image, "an image is required")?;
                Ok(ComposePlan::TextOnly { image })
            }
            GenerationMode::Combined => {
                let image = require(&request.image, "an image is required")?;
                Ok(ComposePlan::Combined {
                    image,
                    background: optional(&request.prompt),
                })
            }
        }
    }

    pub fn mode(&self) -> GenerationMode {
        match self {
            ComposePlan::Edit { .. } => GenerationMode::Edit,
            ComposePlan::Generate { .. } => GenerationMode::Generate,
            ComposePlan::TextOnly { .. } => GenerationMode::TextOnly,
            ComposePlan::Combined { .. } => GenerationMode::Combined,
        }
    }

    /// Compose the outbound payload. Pure function of the plan; all
    /// randomness and creativity are delegated to the remote service.
    pub fn compose(&self) -> GenerationRequest {
        match self {
            ComposePlan::Edit {
                image,
                instruction,
                count,
            } => {
                let count_str = count.to_string();
                let instruction_text = if wants_text_removal(instruction) {
                    prompts::render(
                        prompts::TEXT_REMOVAL,
                        &[("instruction", instruction), ("count", &count_str)],
                    )
                } else {
                    prompts::render(
                        prompts::EDIT,
                        &[("instruction", instruction), ("count", &count_str)],
                    )
                };
                GenerationRequest {
                    instruction_text,
                    source_image: Some(image.clone()),
                    variation_count: *count,
                }
            }
            ComposePlan::Generate { description, count } => GenerationRequest {
                instruction_text: prompts::render(
                    prompts::GENERATE,
                    &[("description", description), ("count", &count.to_string())],
                ),
                source_image: None,
                variation_count: *count,
            },
            // Any user instruction is ignored in text extraction; the
            // template is fixed.
            ComposePlan::TextOnly { image } => GenerationRequest {
                instruction_text: prompts::TEXT_EXTRACT.to_string(),
                source_image: Some(image.clone()),
                variation_count: DEFAULT_VARIATION_COUNT,
            },
            ComposePlan::Combined { image, background } => {
                let removal = prompts::render(
                    prompts::TEXT_REMOVAL,
                    &[
                        ("instruction", COMBINED_LEAD_IN),
                        ("count", &COMBINED_VARIATION_COUNT.to_string()),
                    ],
                );
                let background_clause = match background {
                    Some(description) => prompts::render(
                        prompts::BACKGROUND_CUSTOM,
                        &[("background", description)],
                    ),
                    None => prompts::BACKGROUND_DEFAULT.to_string(),
                };
                GenerationRequest {
                    instruction_text: format!("{} {}", removal, background_clause),
                    source_image: Some(image.clone()),
                    variation_count: COMBINED_VARIATION_COUNT,
                }
            }
        }
    }
}

/// True when the instruction mentions both the text token and the removal
/// token. Two independent substring checks against fixed literals.
fn wants_text_removal(instruction: &str) -> bool {
    let lowered = instruction.to_lowercase();
    lowered.contains(TEXT_TOKEN) && lowered.contains(REMOVAL_TOKEN)
}

fn clamp_count(requested: Option<u8>) -> u8 {
    match requested {
        Some(count) => count.clamp(1, DEFAULT_VARIATION_COUNT),
        None => DEFAULT_VARIATION_COUNT,
    }
}

fn require(field: &Option<String>, message: &str) -> Result<String> {
    optional(field).ok_or_else(|| Error::InvalidInput(message.to_string()))
}

fn optional(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
