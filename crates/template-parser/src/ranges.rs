//! Range computation from start/end marker patterns.
//!
//! Markers are found with flat regex scans over the raw template; no grammar is
//! involved. Every function here fails rather than drop a marker it cannot pair.

use indexmap::IndexMap;
use regex::Regex;
use smol_str::SmolStr;
use template_span::{ByteOffset, RangeSet, Span};

use crate::error::{ParseError, ParseErrorKind};

/// Spans of every match of `pattern` in `text`, in source order.
pub fn marker_spans(text: &str, pattern: &Regex) -> Vec<Span> {
    pattern
        .find_iter(text)
        .map(|m| Span::from_usize(m.start(), m.end()))
        .collect()
}

/// Callee names captured by group 1 of `pattern`, with the offset of each match.
pub fn named_markers(text: &str, pattern: &Regex) -> Vec<(SmolStr, Span)> {
    pattern
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1).map_or("", |m| m.as_str());
            Some((
                SmolStr::new(name),
                Span::from_usize(whole.start(), whole.end()),
            ))
        })
        .collect()
}

fn check_counts(
    construct: &'static str,
    starts: &[Span],
    ends: &[Span],
) -> Result<(), ParseError> {
    if starts.len() == ends.len() {
        return Ok(());
    }
    // Point at the first marker that cannot get a partner.
    let span = if starts.len() > ends.len() {
        starts[ends.len()]
    } else {
        ends[starts.len()]
    };
    Err(ParseError::new(
        ParseErrorKind::UnbalancedMarkers {
            construct,
            starts: starts.len(),
            ends: ends.len(),
        },
        span,
    ))
}

fn pair_positionally(
    construct: &'static str,
    start: Span,
    end: Span,
) -> Result<Span, ParseError> {
    if start.start >= end.start {
        return Err(ParseError::new(
            ParseErrorKind::UnmatchedEndMarker { construct },
            end,
        ));
    }
    Ok(Span::new(start.start, end.start))
}

/// Pairs the i-th start marker with the i-th end marker.
///
/// Each span runs from the start of the opening marker to the start of the
/// closing one. Only valid for constructs that never nest with themselves.
pub fn non_nested_ranges(
    text: &str,
    start: &Regex,
    end: &Regex,
    construct: &'static str,
) -> Result<RangeSet, ParseError> {
    let starts = marker_spans(text, start);
    let ends = marker_spans(text, end);
    check_counts(construct, &starts, &ends)?;

    let mut ranges = RangeSet::new();
    for (open, close) in starts.iter().zip(&ends) {
        ranges.insert(pair_positionally(construct, *open, *close)?);
    }
    tracing::debug!(construct, spans = ranges.len(), "paired non-nested markers");
    Ok(ranges)
}

/// Pairs markers with a depth counter and keeps only the outermost spans.
pub fn nested_ranges(
    text: &str,
    start: &Regex,
    end: &Regex,
    construct: &'static str,
) -> Result<RangeSet, ParseError> {
    let starts = marker_spans(text, start);
    let ends = marker_spans(text, end);
    check_counts(construct, &starts, &ends)?;

    let mut ranges = RangeSet::new();
    let mut depth = 0usize;
    let mut opened = ByteOffset::default();
    let mut next_start = starts.iter().peekable();

    for close in &ends {
        // A start marker at the same offset as an end marker opens first.
        while let Some(open) = next_start.next_if(|open| open.start <= close.start) {
            if depth == 0 {
                opened = open.start;
            }
            depth += 1;
        }

        if depth == 0 {
            return Err(ParseError::new(
                ParseErrorKind::UnmatchedEndMarker { construct },
                *close,
            ));
        }
        depth -= 1;
        if depth == 0 {
            ranges.insert(Span::new(opened, close.start));
        }
    }
    tracing::debug!(construct, spans = ranges.len(), "paired nested markers");
    Ok(ranges)
}

/// Like [`non_nested_ranges`], keyed by the name group 1 of `start` captures.
///
/// A later definition with the same name replaces the earlier one.
pub fn named_ranges(
    text: &str,
    start: &Regex,
    end: &Regex,
    construct: &'static str,
) -> Result<IndexMap<SmolStr, Span>, ParseError> {
    let starts = named_markers(text, start);
    let ends = marker_spans(text, end);
    let start_spans: Vec<Span> = starts.iter().map(|(_, span)| *span).collect();
    check_counts(construct, &start_spans, &ends)?;

    let mut named = IndexMap::with_capacity(starts.len());
    for ((name, open), close) in starts.into_iter().zip(&ends) {
        let span = pair_positionally(construct, open, *close)?;
        if named.insert(name.clone(), span).is_some() {
            tracing::debug!(%name, construct, "duplicate definition, keeping the last one");
        }
    }
    Ok(named)
}

/// Grows `repeated` with every definition reachable from a call site inside it,
/// until no call site adds anything.
///
/// Calls to names without a definition in the same template are dropped.
pub fn close_over_calls(
    repeated: &mut RangeSet,
    mut calls: Vec<(SmolStr, Span)>,
    definitions: &IndexMap<SmolStr, Span>,
) {
    loop {
        let pending = calls.len();
        calls.retain(|(name, site)| {
            if !repeated.contains(site.start) {
                return true;
            }
            match definitions.get(name) {
                Some(definition) => {
                    tracing::trace!(%name, "definition called from a repeated region");
                    repeated.insert(*definition);
                }
                None => tracing::debug!(%name, "call to a definition outside this template"),
            }
            false
        });
        if calls.len() == pending {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn re(pattern: &str) -> Regex {
        Regex::new(pattern).unwrap()
    }

    fn spans(set: &RangeSet) -> Vec<(u32, u32)> {
        set.spans()
            .iter()
            .map(|s| (s.start.into(), s.end.into()))
            .collect()
    }

    #[test]
    fn test_non_nested_pairs_positionally() {
        let text = "[a][/a]..[a]x[/a]";
        let set = non_nested_ranges(text, &re(r"\[a\]"), &re(r"\[/a\]"), "block").unwrap();
        assert_eq!(spans(&set), vec![(0, 3), (9, 13)]);
    }

    #[test]
    fn test_non_nested_count_mismatch() {
        let err = non_nested_ranges("[a][a][/a]", &re(r"\[a\]"), &re(r"\[/a\]"), "block")
            .unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnbalancedMarkers {
                construct: "block",
                starts: 2,
                ends: 1
            }
        );
        assert_eq!(err.span, Span::from_usize(3, 6));
    }

    #[test]
    fn test_non_nested_end_before_start() {
        let err =
            non_nested_ranges("[/a][a]", &re(r"\[a\]"), &re(r"\[/a\]"), "block").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnmatchedEndMarker { construct: "block" });
    }

    #[test]
    fn test_nested_keeps_outermost() {
        let text = "x{for}{for}a{/for}{/for}y{for}b{/for}";
        let set = nested_ranges(text, &re(r"\{for"), &re(r"\{/for"), "loop").unwrap();
        assert_eq!(spans(&set), vec![(1, 18), (25, 31)]);
    }

    #[test]
    fn test_nested_end_at_depth_zero() {
        let err = nested_ranges("{/for}{for}", &re(r"\{for"), &re(r"\{/for"), "loop").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnmatchedEndMarker { construct: "loop" });
        assert_eq!(err.span, Span::from_usize(0, 5));
    }

    #[test]
    fn test_unbalanced_counts_fail_in_both_modes() {
        let start = re(r"<<");
        let end = re(r">>");
        for (text, starts, ends) in [("<< << >>", 2, 1), ("<< >> >>", 1, 2), (">>", 0, 1)] {
            for result in [
                non_nested_ranges(text, &start, &end, "pair"),
                nested_ranges(text, &start, &end, "pair"),
            ] {
                assert_eq!(
                    result.unwrap_err().kind,
                    ParseErrorKind::UnbalancedMarkers {
                        construct: "pair",
                        starts,
                        ends
                    }
                );
            }
        }
    }

    #[test]
    fn test_named_ranges() {
        let text = "{template .a}A{/template}{template .b}B{/template}";
        let named = named_ranges(
            text,
            &re(r"\{template\s+([^\s}]+)"),
            &re(r"\{/template"),
            "template",
        )
        .unwrap();
        let keys: Vec<_> = named.keys().map(SmolStr::as_str).collect();
        assert_eq!(keys, vec![".a", ".b"]);
        assert_eq!(named[".a"], Span::from_usize(0, 14));
        assert_eq!(named[".b"], Span::from_usize(25, 39));
    }

    #[test]
    fn test_close_over_calls_is_transitive() {
        let mut definitions = IndexMap::new();
        definitions.insert(SmolStr::new("t1"), Span::from_usize(0, 10));
        definitions.insert(SmolStr::new("t2"), Span::from_usize(20, 30));
        let calls = vec![
            (SmolStr::new("t1"), Span::from_usize(25, 26)),
            (SmolStr::new("t2"), Span::from_usize(45, 46)),
            (SmolStr::new("missing"), Span::from_usize(46, 47)),
        ];
        let mut repeated: RangeSet = [Span::from_usize(40, 50)].into_iter().collect();

        close_over_calls(&mut repeated, calls, &definitions);

        assert_eq!(spans(&repeated), vec![(0, 10), (20, 30), (40, 50)]);
    }

    #[test]
    fn test_close_over_calls_ignores_calls_outside() {
        let mut definitions = IndexMap::new();
        definitions.insert(SmolStr::new("t1"), Span::from_usize(0, 10));
        let calls = vec![(SmolStr::new("t1"), Span::from_usize(15, 16))];
        let mut repeated: RangeSet = [Span::from_usize(20, 30)].into_iter().collect();

        close_over_calls(&mut repeated, calls, &definitions);

        assert_eq!(spans(&repeated), vec![(20, 30)]);
    }
}
