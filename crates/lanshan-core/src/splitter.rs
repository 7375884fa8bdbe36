//! Separates a reasoning model's deliberation from its final answer.
//!
//! Local reasoning models interleave both in one text stream. A well-formed
//! `<think>...</think>` region is authoritative; without one, a line-based
//! heuristic keyed on discourse markers is used. The heuristic is best-effort.

const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";

/// Phrases that start (or continue) a reasoning run. Matched against the
/// lowercased line.
const REASONING_MARKERS: &[&str] = &[
    "嗯，",
    "这可能是因为",
    "我需要",
    "让我想想",
    "分析一下",
    "考虑到",
    "hmm,",
    "let me think",
    "this might be because",
    "i need to",
    "let me analyze",
    "considering",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Split {
    pub thinking: String,
    pub answer: String,
}

pub fn split_content(raw: &str) -> Split {
    if raw.is_empty() {
        return Split::default();
    }
    split_think_tag(raw).unwrap_or_else(|| split_by_markers(raw))
}

fn split_think_tag(raw: &str) -> Option<Split> {
    let open = raw.find(THINK_OPEN)?;
    let inner_start = open + THINK_OPEN.len();
    let close = inner_start + raw[inner_start..].find(THINK_CLOSE)?;
    let region_end = close + THINK_CLOSE.len();

    let mut answer = String::with_capacity(raw.len() - (region_end - open));
    answer.push_str(&raw[..open]);
    answer.push_str(&raw[region_end..]);

    Some(Split {
        thinking: raw[inner_start..close].trim().to_string(),
        answer: answer.trim().to_string(),
    })
}

fn split_by_markers(raw: &str) -> Split {
    let mut thinking_lines = Vec::new();
    let mut answer_lines = Vec::new();
    let mut in_thinking = false;

    for line in raw.split('\n') {
        if is_reasoning_line(line) {
            in_thinking = true;
            thinking_lines.push(line);
        } else if opens_answer_section(line) {
            in_thinking = false;
            answer_lines.push(line);
        } else if in_thinking {
            thinking_lines.push(line);
        } else {
            answer_lines.push(line);
        }
    }

    if thinking_lines.is_empty() {
        return Split {
            thinking: String::new(),
            answer: raw.to_string(),
        };
    }
    Split {
        thinking: thinking_lines.join("\n").trim().to_string(),
        answer: answer_lines.join("\n").trim().to_string(),
    }
}

fn is_reasoning_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    REASONING_MARKERS.iter().any(|m| lower.contains(m))
}

fn opens_answer_section(line: &str) -> bool {
    line.contains('【') && line.contains('】')
}
