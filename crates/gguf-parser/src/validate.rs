//! Structural and semantic checks over a parsed model.
//!
//! Validation never fails: every problem becomes a [`Finding`]. Metadata
//! findings come first, then tensor findings in declaration order.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::model::{GGUFModel, TensorDescriptor};

/// ggml tensors carry at most four dimensions.
const MAX_RANK: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Advisory,
    Blocking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    MissingArchitecture,
    AlignmentType,
    RankZero,
    RankTooLarge,
    ZeroDimension,
    UnknownElementType,
    PartialBlock,
    MisalignedOffset,
    OutOfBounds,
    Aliased,
    Overlap,
    DuplicateName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum Location {
    Metadata { key: String },
    Tensor { index: usize, name: String },
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata { key } => write!(f, "metadata '{key}'"),
            Self::Tensor { index, name } => write!(f, "tensor #{index} '{name}'"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    pub location: Location,
    pub message: String,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Advisory => "advisory",
            Severity::Blocking => "BLOCKING",
        };
        write!(f, "[{tag}] {}: {}", self.location, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    pub fn has_blocking(&self) -> bool {
        self.findings
            .iter()
            .any(|f| f.severity == Severity::Blocking)
    }

    pub fn blocking(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Blocking)
    }

    pub fn advisories(&self) -> impl Iterator<Item = &Finding> {
        self.findings
            .iter()
            .filter(|f| f.severity == Severity::Advisory)
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    fn push(&mut self, severity: Severity, kind: FindingKind, location: Location, message: String) {
        self.findings.push(Finding {
            severity,
            kind,
            location,
            message,
        });
    }
}

/// Run every check over `model`.
pub fn validate(model: &GGUFModel) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_metadata(model, &mut report);

    let overlaps = find_overlaps(&model.tensors);
    let mut first_by_offset: HashMap<u64, usize> = HashMap::new();
    let mut first_by_name: HashMap<&str, usize> = HashMap::new();

    for (index, t) in model.tensors.iter().enumerate() {
        let loc = || Location::Tensor {
            index,
            name: t.name.clone(),
        };
        check_shape(t, &loc, &mut report);

        match t.traits() {
            None => report.push(
                Severity::Advisory,
                FindingKind::UnknownElementType,
                loc(),
                format!("element type id {} is not recognised", t.type_id),
            ),
            Some(traits) => {
                let inner = t.dims.first().copied().unwrap_or(0);
                if traits.is_quantized() && inner % traits.block_size != 0 {
                    report.push(
                        Severity::Advisory,
                        FindingKind::PartialBlock,
                        loc(),
                        format!(
                            "row length {inner} is not a multiple of the {} block size {}",
                            traits.name, traits.block_size
                        ),
                    );
                }
            }
        }

        if t.offset.checked_rem(model.alignment).is_some_and(|r| r != 0) {
            report.push(
                Severity::Advisory,
                FindingKind::MisalignedOffset,
                loc(),
                format!(
                    "offset {} is not aligned to {} bytes",
                    t.offset, model.alignment
                ),
            );
        }

        check_bounds(t, model.file_size, &loc, &mut report);

        if let Some(&first) = first_by_offset.get(&t.offset) {
            report.push(
                Severity::Blocking,
                FindingKind::Aliased,
                loc(),
                format!(
                    "shares offset {} with tensor #{first} '{}'",
                    t.offset,
                    model.tensors.get(first).map_or("", |o| o.name.as_str())
                ),
            );
        } else {
            first_by_offset.insert(t.offset, index);
            if let Some(&other) = overlaps.get(&index) {
                report.push(
                    Severity::Advisory,
                    FindingKind::Overlap,
                    loc(),
                    format!(
                        "byte range overlaps tensor #{other} '{}'",
                        model.tensors.get(other).map_or("", |o| o.name.as_str())
                    ),
                );
            }
        }

        if let Some(&first) = first_by_name.get(t.name.as_str()) {
            report.push(
                Severity::Advisory,
                FindingKind::DuplicateName,
                loc(),
                format!("name already used by tensor #{first}"),
            );
        } else {
            first_by_name.insert(t.name.as_str(), index);
        }
    }

    debug!(
        findings = report.findings.len(),
        blocking = report.blocking().count(),
        "validation complete"
    );
    report
}

fn check_metadata(model: &GGUFModel, report: &mut ValidationReport) {
    if model.architecture().is_none() {
        report.push(
            Severity::Advisory,
            FindingKind::MissingArchitecture,
            Location::Metadata {
                key: "general.architecture".into(),
            },
            "architecture name is missing or not a string".into(),
        );
    }
    if model
        .get("general.alignment")
        .is_some_and(|v| !v.is_integer())
    {
        report.push(
            Severity::Advisory,
            FindingKind::AlignmentType,
            Location::Metadata {
                key: "general.alignment".into(),
            },
            format!(
                "alignment is not an integer; using {}",
                model.alignment
            ),
        );
    }
}

fn check_shape(t: &TensorDescriptor, loc: &dyn Fn() -> Location, report: &mut ValidationReport) {
    if t.dims.is_empty() {
        report.push(
            Severity::Advisory,
            FindingKind::RankZero,
            loc(),
            "tensor has no dimensions".into(),
        );
    } else if t.dims.len() > MAX_RANK {
        report.push(
            Severity::Advisory,
            FindingKind::RankTooLarge,
            loc(),
            format!("rank {} exceeds {MAX_RANK}", t.dims.len()),
        );
    }
    if let Some(axis) = t.dims.iter().position(|&d| d == 0) {
        report.push(
            Severity::Advisory,
            FindingKind::ZeroDimension,
            loc(),
            format!("dimension {axis} is zero"),
        );
    }
}

fn check_bounds(
    t: &TensorDescriptor,
    file_size: u64,
    loc: &dyn Fn() -> Location,
    report: &mut ValidationReport,
) {
    if t.traits().is_none() {
        return;
    }
    match t.byte_range() {
        None => report.push(
            Severity::Blocking,
            FindingKind::OutOfBounds,
            loc(),
            "byte range overflows a 64-bit offset".into(),
        ),
        Some(range) if range.end > file_size => report.push(
            Severity::Blocking,
            FindingKind::OutOfBounds,
            loc(),
            format!(
                "bytes {}..{} extend past end of file ({file_size} bytes)",
                range.start, range.end
            ),
        ),
        Some(_) => {}
    }
}

/// Map each later-declared tensor to an earlier one whose byte range it
/// partially overlaps. Identical starts are aliasing and not reported here.
fn find_overlaps(tensors: &[TensorDescriptor]) -> HashMap<usize, usize> {
    let mut ranges: Vec<(u64, u64, usize)> = tensors
        .iter()
        .enumerate()
        .filter_map(|(i, t)| t.byte_range().map(|r| (r.start, r.end, i)))
        .filter(|(start, end, _)| end > start)
        .collect();
    ranges.sort_unstable();

    let mut overlaps = HashMap::new();
    // furthest-reaching range among strictly smaller starts: (end, index)
    let mut reach: Option<(u64, usize)> = None;
    for group in ranges.chunk_by(|a, b| a.0 == b.0) {
        for &(start, _, index) in group {
            let Some((r_end, r_index)) = reach else {
                continue;
            };
            if start < r_end {
                let (early, late) = if r_index < index {
                    (r_index, index)
                } else {
                    (index, r_index)
                };
                overlaps.entry(late).or_insert(early);
            }
        }
        let furthest = group
            .iter()
            .map(|&(_, end, index)| (end, index))
            .max_by_key(|&(end, _)| end);
        if let Some(f) = furthest.filter(|f| reach.is_none_or(|(r_end, _)| f.0 > r_end)) {
            reach = Some(f);
        }
    }
    overlaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::test_factory::{GGUFBuilder, single_f32_tensor};

    fn kinds(report: &ValidationReport) -> Vec<FindingKind> {
        report.findings.iter().map(|f| f.kind).collect()
    }

    #[test]
    fn minimal_file_has_only_missing_architecture() {
        let model = parse(&single_f32_tensor()).unwrap();
        let report = validate(&model);
        assert_eq!(kinds(&report), vec![FindingKind::MissingArchitecture]);
        assert!(!report.has_blocking());
    }

    #[test]
    fn identical_offsets_are_blocking() {
        let bytes = GGUFBuilder::new(3)
            .kv_str("general.architecture", "llama")
            .tensor("a", &[4], 0, 0)
            .tensor("b", &[4], 0, 0)
            .data(&[0u8; 16])
            .build();
        let report = validate(&parse(&bytes).unwrap());
        assert_eq!(kinds(&report), vec![FindingKind::Aliased]);
        assert!(report.has_blocking());
        assert_eq!(
            report.findings[0].location,
            Location::Tensor {
                index: 1,
                name: "b".into()
            }
        );
    }

    #[test]
    fn out_of_bounds_is_blocking() {
        let bytes = GGUFBuilder::new(3)
            .kv_str("general.architecture", "llama")
            .tensor("big", &[1024], 0, 0)
            .data(&[0u8; 16])
            .build();
        let report = validate(&parse(&bytes).unwrap());
        assert_eq!(kinds(&report), vec![FindingKind::OutOfBounds]);
        assert_eq!(report.blocking().count(), 1);
    }

    #[test]
    fn partial_overlap_is_advisory() {
        let bytes = GGUFBuilder::new(3)
            .kv_str("general.architecture", "llama")
            .tensor("a", &[16], 0, 0)
            .tensor("b", &[8], 0, 32)
            .tensor("c", &[8], 0, 64)
            .data(&[0u8; 96])
            .build();
        // a covers 0..64, b sits inside it, c is clear
        let report = validate(&parse(&bytes).unwrap());
        assert_eq!(kinds(&report), vec![FindingKind::Overlap]);
        assert!(!report.has_blocking());
        assert!(report.findings[0].message.contains("'a'"));
    }

    #[test]
    fn overlap_is_reported_alongside_aliasing() {
        let bytes = GGUFBuilder::new(3)
            .kv_str("general.architecture", "llama")
            .tensor("a", &[16], 0, 0)
            .tensor("b", &[24], 0, 32)
            .tensor("c", &[12], 0, 32)
            .data(&[0u8; 128])
            .build();
        // a covers 0..64; b (32..128) and c (32..80) share a start
        let report = validate(&parse(&bytes).unwrap());
        assert_eq!(kinds(&report), vec![FindingKind::Overlap, FindingKind::Aliased]);
        assert_eq!(
            report.findings[0].location,
            Location::Tensor {
                index: 1,
                name: "b".into()
            }
        );
        assert!(report.findings[0].message.contains("'a'"));
        assert_eq!(report.blocking().count(), 1);
    }

    #[test]
    fn shape_and_type_advisories_in_declaration_order() {
        let bytes = GGUFBuilder::new(3)
            .kv_f32("general.alignment", 32.0)
            .tensor("scalar", &[], 0, 0)
            .tensor("empty", &[4, 0], 0, 32)
            .tensor("odd", &[8], 77, 64)
            .tensor("ragged", &[40], 2, 96)
            .tensor("shifted", &[1], 0, 200)
            .tensor("empty", &[1], 0, 224)
            .data(&[0u8; 256])
            .build();
        let report = validate(&parse(&bytes).unwrap());
        assert_eq!(
            kinds(&report),
            vec![
                FindingKind::MissingArchitecture,
                FindingKind::AlignmentType,
                FindingKind::RankZero,
                FindingKind::ZeroDimension,
                FindingKind::UnknownElementType,
                FindingKind::PartialBlock,
                FindingKind::MisalignedOffset,
                FindingKind::DuplicateName,
            ]
        );
        assert!(report.advisories().count() == report.findings.len());
    }

    #[test]
    fn validation_is_deterministic() {
        let bytes = GGUFBuilder::new(3)
            .tensor("a", &[4], 0, 0)
            .tensor("b", &[4], 0, 0)
            .tensor("c", &[9999], 0, 0)
            .data(&[0u8; 16])
            .build();
        let model = parse(&bytes).unwrap();
        let first: Vec<String> = validate(&model).findings.iter().map(|f| f.to_string()).collect();
        let second: Vec<String> = validate(&model).findings.iter().map(|f| f.to_string()).collect();
        assert_eq!(first, second);
    }
}
