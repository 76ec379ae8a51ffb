pub mod error;

use crate::data::{InteractionData, RequestData, ResponseData};
use error::Error;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Write as _,
    fs,
    path::Path,
};

lazy_static! {
    static ref HEADER_REGEX: Regex =
        Regex::new(r"(?m)^(?P<header_key>[a-zA-Z0-9_\-]+): (?P<header_value>.*?)\r?$").unwrap();
    static ref INTERACTION_HEADING_REGEX: Regex = Regex::new(
        r"(?m)^## Interaction (?P<interaction_number>[0-9]+): (?P<http_method>[A-Z]+) (?P<url>\S+)"
    )
    .unwrap();
    static ref REQUEST_HEADERS_HEADING_REGEX: Regex =
        Regex::new(r"(?m)^### Request headers recorded for playback.*$").unwrap();
    static ref REQUEST_BODY_HEADING_REGEX: Regex =
        Regex::new(r"(?m)^### Request body recorded for playback.*$").unwrap();
    static ref RESPONSE_HEADERS_HEADING_REGEX: Regex =
        Regex::new(r"(?m)^### Response headers recorded for playback.*$").unwrap();
    static ref RESPONSE_BODY_HEADING_REGEX: Regex = Regex::new(
        r"(?m)^### Response body recorded for playback \((?P<status_code>[0-9]+)[^)]*\).*$"
    )
    .unwrap();
}

const MIN_FENCE_LEN: usize = 3;

pub fn load_interactions<P: AsRef<Path>>(filename: P) -> Result<Vec<InteractionData>, Error> {
    let file_contents = fs::read_to_string(filename)?;

    parse_interactions(&file_contents)
}

/// Parses interactions in file order.
///
/// The file is read with a cursor so that text inside a fenced block is never
/// taken for a heading. Block contents are returned verbatim, minus the line
/// break that follows the opening fence and the one before the closing fence.
pub fn parse_interactions(file_contents: &str) -> Result<Vec<InteractionData>, Error> {
    let mut data = Vec::new();
    let mut rest = file_contents;

    while let Some(heading) = INTERACTION_HEADING_REGEX.captures(rest) {
        let interaction_number = heading["interaction_number"]
            .parse()
            .map_err(|_| Error::InvalidInteractionNumber(heading["interaction_number"].into()))?;
        let url = heading["url"].to_string();
        let method = heading["http_method"].to_string();
        rest = &rest[heading.get(0).map_or(0, |m| m.end())..];

        let (_, request_headers, after) = fenced_section(rest, &REQUEST_HEADERS_HEADING_REGEX)?;
        let (_, request_body, after) = fenced_section(after, &REQUEST_BODY_HEADING_REGEX)?;
        let (_, response_headers, after) = fenced_section(after, &RESPONSE_HEADERS_HEADING_REGEX)?;
        let (response_heading, response_body, after) =
            fenced_section(after, &RESPONSE_BODY_HEADING_REGEX)?;
        let status_code = response_heading["status_code"]
            .parse()
            .map_err(|_| Error::InvalidStatusCode(response_heading["status_code"].into()))?;
        rest = after;

        data.push(InteractionData {
            interaction_number,
            request_data: RequestData {
                url,
                method,
                headers: parse_headers(request_headers),
                body: request_body.into(),
            },
            response_data: ResponseData {
                status_code,
                headers: parse_headers(response_headers),
                body: response_body.into(),
            },
        });
    }

    if data.is_empty() {
        Err(Error::InvalidMarkdownFormat)
    } else {
        Ok(data)
    }
}

/// Finds the next `heading` in `text` and the fenced block below it. Returns
/// the heading captures, the block contents and the text after the block.
fn fenced_section<'t>(
    text: &'t str,
    heading: &Regex,
) -> Result<(Captures<'t>, &'t str, &'t str), Error> {
    let captures = heading.captures(text).ok_or(Error::InvalidMarkdownFormat)?;
    let below = &text[captures.get(0).map_or(0, |m| m.end())..];
    let (contents, after) = fenced_block(below).ok_or(Error::InvalidMarkdownFormat)?;

    Ok((captures, contents, after))
}

/// The closing fence is a line holding exactly the opening fence.
fn fenced_block(text: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    let mut opened: Option<(&str, usize)> = None;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let marker = line.trim_end_matches(|c| c == '\r' || c == '\n');

        match opened {
            None if marker.len() >= MIN_FENCE_LEN && marker.bytes().all(|b| b == b'`') => {
                opened = Some((marker, offset));
            }
            None => {}
            Some((fence, contents_start)) if marker == fence => {
                let contents = &text[contents_start..line_start];
                let contents = contents
                    .strip_suffix("\r\n")
                    .or_else(|| contents.strip_suffix('\n'))
                    .unwrap_or(contents);
                return Some((contents, &text[offset..]));
            }
            Some(_) => {}
        }
    }

    None
}

fn parse_headers<T: AsRef<str>>(headers_part: T) -> HashMap<String, String> {
    let mut headers = HashMap::new();

    for capture in HEADER_REGEX.captures_iter(headers_part.as_ref()) {
        headers.insert(
            String::from(capture["header_key"].trim()),
            String::from(capture["header_value"].trim()),
        );
    }

    headers
}

pub fn save_interactions<'a, P: AsRef<Path>, I: IntoIterator<Item = &'a InteractionData>>(
    markdown_path: P,
    interactions: I,
) -> Result<(), Error> {
    fs::write(markdown_path, render_interactions(interactions))?;

    Ok(())
}

/// Renders interactions in cassette order. Sections are numbered by position,
/// headers are written sorted by name.
pub fn render_interactions<'a, I: IntoIterator<Item = &'a InteractionData>>(
    interactions: I,
) -> String {
    let mut markdown = String::new();

    for (number, interaction) in interactions.into_iter().enumerate() {
        let request = &interaction.request_data;
        let response = &interaction.response_data;

        // writing into a String cannot fail
        let _ = write!(
            markdown,
            "## Interaction {}: {} {}\r\n\r\n",
            number, request.method, request.url
        );

        markdown.push_str("### Request headers recorded for playback:\r\n\r\n```\r\n");
        push_headers(&mut markdown, &request.headers);
        markdown.push_str("```\r\n\r\n");

        let _ = write!(
            markdown,
            "### Request body recorded for playback ({}):\r\n\r\n",
            header_value(&request.headers, "content-type"),
        );
        push_body(&mut markdown, &request.body);

        markdown.push_str("### Response headers recorded for playback:\r\n\r\n```\r\n");
        push_headers(&mut markdown, &response.headers);
        markdown.push_str("```\r\n\r\n");

        let _ = write!(
            markdown,
            "### Response body recorded for playback ({}: {}):\r\n\r\n",
            response.status_code,
            header_value(&response.headers, "content-type"),
        );
        push_body(&mut markdown, &response.body);
    }

    markdown
}

/// Fences `body` with more backticks than any run inside it.
fn push_body(markdown: &mut String, body: &str) {
    let longest_run = body.split(|c| c != '`').map(str::len).max().unwrap_or(0);
    let fence = "`".repeat(std::cmp::max(MIN_FENCE_LEN, longest_run + 1));

    let _ = write!(markdown, "{}\r\n{}\r\n{}\r\n\r\n", fence, body, fence);
}

fn push_headers(markdown: &mut String, headers: &HashMap<String, String>) {
    for (key, value) in headers.iter().collect::<BTreeMap<_, _>>() {
        let _ = write!(markdown, "{}: {}\r\n", key, value);
    }
}

fn header_value<'a>(headers: &'a HashMap<String, String>, name: &str) -> &'a str {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map_or("", |(_, value)| value.as_str())
}
