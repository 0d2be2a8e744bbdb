use crate::config::TemplateLayout;
use crate::document::GeneralData;

const UNSAFE_CHARS: &[char] = &['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

pub fn download_file_name(general: &GeneralData, layout: &TemplateLayout) -> String {
    let name: String = general
        .service_name
        .trim()
        .to_uppercase()
        .chars()
        .map(|c| if UNSAFE_CHARS.contains(&c) || c.is_control() { '-' } else { c })
        .collect();
    let name = name.split_whitespace().collect::<Vec<_>>().join(" ");

    if name.is_empty() {
        format!("{}{}.xlsx", layout.file_name_prefix, layout.fallback_file_name)
    } else {
        format!("{}{}.xlsx", layout.file_name_prefix, name)
    }
}
