//! Prompt construction for the remote generative API.
//!
//! The wrapper-div instructions exist so the post-processor can wrap body
//! content without ending up with two nested `.generated-content` containers.

pub const CREATE_SYSTEM: &str =
    "You are an assistant that generates clean, well-structured HTML code based on user instructions.";

pub const EDIT_SYSTEM: &str =
    "You are an assistant that modifies HTML code based on user instructions.";

pub const DESCRIBE_SYSTEM: &str = "You are an assistant that generates responsive HTML code.";

/// Fixed question asked of the vision model.
pub const VISION_PROMPT: &str = "What is in this image?";

const WRAPPER_INSTRUCTIONS: &str = "Please ensure that the generated HTML structure has a single \
    wrapper div with the class generated-content that covers the full width and height of the \
    viewport, with no gaps on the sides or top and bottom. Inside this wrapper, one more \
    generated-content div class should not exist. Avoid adding extra unnecessary wrapper divs.";

/// User prompt for generating a document from a raw instruction.
pub fn create_prompt(instruction: &str) -> String {
    format!("{instruction}\n\n{WRAPPER_INSTRUCTIONS}")
}

/// User prompt for modifying an existing document.
///
/// The current markup is embedded verbatim. The model is told to disregard the
/// background-image style block so a best-effort background survives edits.
pub fn edit_prompt(current_markup: &str, instruction: &str) -> String {
    format!(
        "Here is the HTML content:\n{current_markup}\n\n\
         Note: The HTML contains a background image set via CSS in the <head> tag. Please ignore \
         any styles related to the background image and focus on modifying the content within the \
         body as specified below.\n\n\
         Example changes:\n\
         - \"Change the color of the RSVP button to blue\" should change the color attribute of the button to blue.\n\
         - \"Add a new checkbox labeled 'I agree' below the last paragraph\" should add a checkbox without removing any elements.\n\n\
         Requested change:\n{instruction}"
    )
}

/// User prompt for generating a document from an image description.
pub fn description_prompt(description: &str) -> String {
    format!(
        "You are an assistant that generates HTML code based on image descriptions. Please create \
         a visually appealing HTML template that closely matches the style (most importantly \
         colors of the elements) and elements described. The template should use a full-width \
         layout, include prominent use of the dominant colors, and feature any specific elements \
         like borders or icons as described in: {description}\n\n{WRAPPER_INSTRUCTIONS}"
    )
}

/// Image prompt for the background-image generator. Artwork only; text,
/// buttons or logos in the background would fight the generated document.
pub fn background_image_prompt(description: &str) -> String {
    format!(
        "{description}, abstract, pattern, or nature-inspired background, \
         without any text, buttons, or logos"
    )
}
