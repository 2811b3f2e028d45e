//! Pattern extraction from portal markup.
//!
//! The portal renders everything server-side, so class and task identifiers
//! are pulled out of raw HTML with pattern matches tied to the current page
//! layout. All of that brittleness lives behind the three functions in this
//! module; a markup change on the site should only ever touch this file.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

/// Literal phrase the portal embeds in a successful submission response.
pub const SUCCESS_PHRASE: &str = "签到成功";

/// Attribute marker that opens a class's display name element.
const NAME_MARKER: &str = r#"class="course_name""#;

/// How far (in bytes) past a course id the name marker may appear before we
/// give up and report an empty display name.
const NAME_WINDOW: usize = 4096;

lazy_static! {
    static ref CLASS_ID_RE: Regex = Regex::new(r#"course_id="(\d+)""#).unwrap();
    static ref TASK_ID_RE: Regex = Regex::new(r#"onclick="punch_gps\((\d+)\)""#).unwrap();
}

/// One enrolled class as scraped from the dashboard page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassRecord {
    pub id: String,
    /// Display name, empty when the name fragment could not be located.
    pub name: String,
}

/// All unique class identifiers in document order, each paired with the
/// display name found shortly after its marker.
pub fn class_list(html: &str) -> Vec<ClassRecord> {
    let mut seen = HashSet::new();
    let mut classes = Vec::new();
    for caps in CLASS_ID_RE.captures_iter(html) {
        let id = caps[1].to_string();
        if !seen.insert(id.clone()) {
            continue;
        }
        let tail = &html[caps.get(0).map(|m| m.end()).unwrap_or(html.len())..];
        classes.push(ClassRecord {
            name: display_name(tail),
            id,
        });
    }
    classes
}

/// Bounded-window search for the display name following one id occurrence.
fn display_name(tail: &str) -> String {
    let Some(marker) = tail.find(NAME_MARKER) else {
        return String::new();
    };
    if marker > NAME_WINDOW {
        return String::new();
    }
    let rest = &tail[marker + NAME_MARKER.len()..];
    let Some(close) = rest.find('>') else {
        return String::new();
    };
    let text = &rest[close + 1..];
    let end = text.find('<').unwrap_or(text.len());
    text[..end].trim().to_string()
}

/// First active check-in task id in page order, if any.
pub fn first_task_id(html: &str) -> Option<String> {
    TASK_ID_RE
        .captures(html)
        .map(|caps| caps[1].to_string())
}

/// Verdict classification: the submission succeeded iff the portal's
/// success phrase appears anywhere in the response body.
pub fn is_success(body: &str) -> bool {
    body.contains(SUCCESS_PHRASE)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard(entries: &[(&str, &str)]) -> String {
        let mut html = String::from("<html><body><div class=\"course-list\">");
        for (id, name) in entries {
            html.push_str(&format!(
                r#"<div course_id="{id}" class="course-card"><span class="course_name" title="{name}">{name}</span></div>"#
            ));
        }
        html.push_str("</div></body></html>");
        html
    }

    #[test]
    fn extracts_all_classes_in_document_order() {
        let html = dashboard(&[("42", "Math 101"), ("77", "Physics II"), ("9", "Lab")]);
        let classes = class_list(&html);
        assert_eq!(classes.len(), 3);
        assert_eq!(classes[0], ClassRecord { id: "42".into(), name: "Math 101".into() });
        assert_eq!(classes[1].id, "77");
        assert_eq!(classes[2].name, "Lab");
    }

    #[test]
    fn duplicate_ids_collapse_to_first_occurrence() {
        let html = dashboard(&[("42", "Math 101"), ("42", "Math 101 again"), ("7", "Chem")]);
        let classes = class_list(&html);
        assert_eq!(classes.len(), 2);
        assert_eq!(classes[0].name, "Math 101");
        assert_eq!(classes[1].id, "7");
    }

    #[test]
    fn empty_page_yields_no_classes() {
        assert!(class_list("<html><body>nothing here</body></html>").is_empty());
        assert!(class_list("").is_empty());
    }

    #[test]
    fn missing_name_marker_yields_empty_name() {
        let html = r#"<div course_id="13"><span>no marker</span></div>"#;
        let classes = class_list(html);
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].id, "13");
        assert_eq!(classes[0].name, "");
    }

    #[test]
    fn name_marker_beyond_window_is_ignored() {
        let mut html = String::from(r#"<div course_id="5">"#);
        html.push_str(&" ".repeat(NAME_WINDOW + 10));
        html.push_str(r#"<span class="course_name">Too Far</span>"#);
        let classes = class_list(&html);
        assert_eq!(classes[0].name, "");
    }

    #[test]
    fn name_does_not_bleed_into_next_class() {
        // Second class card sits right after the first; each id must pick up
        // its own name, not the neighbour's.
        let html = dashboard(&[("1", "First"), ("2", "Second")]);
        let classes = class_list(&html);
        assert_eq!(classes[0].name, "First");
        assert_eq!(classes[1].name, "Second");
    }

    #[test]
    fn first_task_id_takes_first_in_page_order() {
        let html = r#"
            <button onclick="punch_gps(999)">check in</button>
            <button onclick="punch_gps(1000)">check in</button>
        "#;
        assert_eq!(first_task_id(html), Some("999".to_string()));
    }

    #[test]
    fn no_task_marker_yields_none() {
        assert_eq!(first_task_id("<html><body>no tasks</body></html>"), None);
        assert_eq!(first_task_id(""), None);
    }

    #[test]
    fn verdict_requires_the_literal_phrase() {
        assert!(is_success("<div>签到成功</div>"));
        assert!(is_success("前缀 签到成功 后缀"));
        assert!(!is_success("<div>签到失败</div>"));
        assert!(!is_success(""));
        assert!(!is_success("sign-in ok"));
    }
}
