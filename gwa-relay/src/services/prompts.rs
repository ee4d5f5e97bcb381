//! Prompt templates for the two model-backed operations
//!
//! Pure string templating. The wording is the system's only real "business
//! rule" and is kept byte-for-byte compatible with the deployed service, so
//! edits here change model behavior.

/// System instruction attached to every model call
pub const SYSTEM_INSTRUCTION: &str = "You are an expert at detect greenwashing.";

const SINGLE_IMAGE_PROMPT: &str = "Take a look at the image and tell whether this is potential greenwashing. The image might include ingredients of the product. Use the ingredients to assist in your analysis. Support your answer with reason. The response should be in JSON format { companyName: \"\", analysis:\"\" }. Do not return anything else.";

const TWO_IMAGE_PROMPT: &str = "Take a look at the images and tell whether this is potential greenwashing. The images might include ingredients of the product. Use the ingredients to assist in your analysis. Support your answer with reason. The response should be in JSON format { companyName: \"\", analysis:\"\" }. Do not return anything else.";

/// Instruction text for the image-analysis call.
///
/// Callers guarantee `image_count` is 1 or 2; any other count is a
/// request-validation failure upstream of prompt construction.
pub fn image_analysis_prompt(image_count: usize) -> &'static str {
    if image_count <= 1 {
        SINGLE_IMAGE_PROMPT
    } else {
        TWO_IMAGE_PROMPT
    }
}

/// Instruction text for the verdict-synthesis call.
///
/// The report content is treated as ground truth; the reply is rendered
/// as-is (no JSON contract).
pub fn verdict_prompt(analysis: &str, report_text: &str) -> String {
    format!(
        "This is the judgement made by a expert for an advertisement for potential greenwashing.\n\
         {analysis}\n\
         This is the text content extracted from reports published by the company.\n\
         {report_text}\n\
         Considering the reports to be true list down the positive aspects, possible greenwashing indicators and the verdict for potential greenwashing.\n\
         Support your answer with reason."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_and_two_image_variants_differ() {
        let one = image_analysis_prompt(1);
        let two = image_analysis_prompt(2);
        assert_ne!(one, two);
        assert!(one.contains("the image and"));
        assert!(two.contains("the images and"));
    }

    #[test]
    fn image_prompt_demands_fenced_json_shape() {
        for count in [1, 2] {
            let p = image_analysis_prompt(count);
            assert!(p.contains("JSON format { companyName: \"\", analysis:\"\" }"));
            assert!(p.contains("Do not return anything else."));
            assert!(p.contains("ingredients"));
        }
    }

    #[test]
    fn verdict_prompt_embeds_both_inputs() {
        let p = verdict_prompt("Uses vague terms", "Annual sustainability report...");
        assert!(p.contains("Uses vague terms"));
        assert!(p.contains("Annual sustainability report..."));
        assert!(p.contains("positive aspects"));
        assert!(p.contains("possible greenwashing indicators"));
        assert!(p.contains("Considering the reports to be true"));
    }

    #[test]
    fn verdict_prompt_is_deterministic() {
        assert_eq!(verdict_prompt("a", "b"), verdict_prompt("a", "b"));
    }
}
