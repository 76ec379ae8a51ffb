use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RESOURCE_FILE_REGEX: Regex = Regex::new(
        r"^.*/services/[^/]+/(?:data_source_|resource_|iam_)(.*?)(?:_test|_sweeper|_iam_test|_generated_test|_internal_test)?\.go"
    )
    .unwrap();
    static ref RESOURCE_DOCS_REGEX: Regex =
        Regex::new(r"^.*website/docs/(?:r|d)/(.*)\.html\.markdown").unwrap();
}

const RESOURCE_PREFIX: &str = "google_";

/// Maps a changed file in a provider repo to the resource it belongs to.
///
/// Service source files and resource/data source docs are recognised;
/// anything else belongs to no resource.
pub fn file_to_resource(path: &str) -> Option<String> {
    let regex: &Regex = if path.ends_with(".go") {
        &RESOURCE_FILE_REGEX
    } else if path.ends_with(".html.markdown") {
        &RESOURCE_DOCS_REGEX
    } else {
        return None;
    };
    let captures = regex.captures(path)?;

    let resource = captures.get(1)?.as_str();
    if resource.starts_with(RESOURCE_PREFIX) {
        Some(resource.to_string())
    } else {
        Some(format!("{}{}", RESOURCE_PREFIX, resource))
    }
}

pub fn path_changed<S: AsRef<str>>(path: &str, changed_files: &[S]) -> bool {
    changed_files
        .iter()
        .any(|file| file.as_ref().starts_with(path))
}
