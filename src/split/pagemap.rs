//! Visible page number detection and interpolation.
//!
//! Printed page numbers rarely match physical PDF indices: front matter,
//! roman-numbered prefaces, and cover pages shift everything. The detector
//! builds a sparse map from the numbers actually printed on pages; the
//! interpolator fills the holes between detected anchors so any chapter's
//! printed page number can be resolved to a physical index.

use crate::extract;
use lopdf::Document;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Mapping from visible (printed) page number to zero-based physical index.
pub type PageMap = BTreeMap<u32, usize>;

static RE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// Scan every page for its printed page number.
///
/// Only the first three and last three non-empty lines of a page are
/// candidates: printed page numbers live in headers and footers, and
/// scanning the whole page would pick up figure numbers and inline digits.
/// The first candidate (in scan order) containing a run of digits decides
/// the page; the visible number is recorded only if no earlier page already
/// claimed it. Pages without a parsable number are simply absent.
pub fn detect_visible_pages(doc: &Document) -> PageMap {
    let mut map = PageMap::new();
    for (physical, page_no) in doc.get_pages().keys().copied().enumerate() {
        let Some(text) = extract::page_text(doc, page_no) else {
            continue;
        };
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        let head = lines.iter().take(3);
        let tail = lines.iter().skip(lines.len().saturating_sub(3));
        for line in head.chain(tail) {
            if let Some(m) = RE_DIGITS.find(line) {
                if let Ok(visible) = m.as_str().parse::<u32>() {
                    map.entry(visible).or_insert(physical);
                }
                break;
            }
        }
    }
    debug!(anchors = map.len(), "detected visible page numbers");
    map
}

/// Fill in missing visible page numbers by linear interpolation between
/// adjacent known anchors.
///
/// A segment whose visible-number gap exceeds `max_gap` is skipped (those
/// visible numbers stay unmapped) — a guard against one bad detection
/// bridging hundreds of pages. The final anchor is always carried into the
/// output. With fewer than two anchors no interpolation is possible and the
/// output equals the input.
///
/// Physical indices are not validated for monotonicity; a reversed pair of
/// anchors interpolates with a negative step, clamped at zero.
pub fn interpolate(map: &PageMap, max_gap: u32) -> PageMap {
    if map.len() < 2 {
        return map.clone();
    }

    let known: Vec<(u32, usize)> = map.iter().map(|(&v, &p)| (v, p)).collect();
    let mut full = PageMap::new();

    for pair in known.windows(2) {
        let (vis1, int1) = pair[0];
        let (vis2, int2) = pair[1];
        let delta = vis2 - vis1;

        if delta > max_gap {
            warn!(
                from = vis1,
                to = vis2,
                max_gap,
                "skipping interpolation: visible page range too large"
            );
            continue;
        }

        let step = (int2 as f64 - int1 as f64) / f64::from(delta);
        debug!(from = vis1, to = vis2, step, "interpolating visible page range");
        for v in vis1..vis2 {
            let physical = (int1 as f64 + step * f64::from(v - vis1)).round();
            full.insert(v, physical.max(0.0) as usize);
        }
    }

    if let Some((&vis, &int)) = map.iter().next_back() {
        full.insert(vis, int);
    }

    full
}
