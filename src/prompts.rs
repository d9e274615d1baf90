pub const TEXT_REMOVAL: &str = include_str!("../data/prompts/text_removal.txt");
pub const EDIT: &str = include_str!("../data/prompts/edit.txt");
pub const TEXT_EXTRACT: &str = include_str!("../data/prompts/text_extract.txt");
pub const GENERATE: &str = include_str!("../data/prompts/generate.txt");
pub const BACKGROUND_CUSTOM: &str = include_str!("../data/prompts/background_custom.txt");
pub const BACKGROUND_DEFAULT: &str = include_str!("../data/prompts/background_default.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
