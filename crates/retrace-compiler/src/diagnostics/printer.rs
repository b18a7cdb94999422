//! Renders a syntax error as an annotated snippet of the pattern.

use std::ops::Range;

use annotate_snippets::{AnnotationKind, Group, Level, Renderer, Snippet};

use super::SyntaxError;

pub(super) fn render(error: &SyntaxError, pattern: &str, colored: bool) -> String {
    let renderer = if colored {
        Renderer::styled()
    } else {
        Renderer::plain()
    };

    let message = error.kind.to_string();
    let snippet = Snippet::source(pattern)
        .line_start(1)
        .annotation(AnnotationKind::Primary.span(adjust_range(&error.span, pattern.len())));
    let report: Vec<Group> = vec![Level::ERROR.primary_title(&message).element(snippet)];
    renderer.render(&report).to_string()
}

/// Widens empty spans to one byte so the caret is visible; clamps to the source.
fn adjust_range(range: &Range<usize>, limit: usize) -> Range<usize> {
    let start = range.start.min(limit);
    let end = range.end.min(limit);
    if start == end {
        return start..(start + 1).min(limit);
    }
    start..end
}
