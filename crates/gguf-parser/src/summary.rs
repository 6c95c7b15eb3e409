//! One-screen overview of a GGUF file.

use std::fmt;

use serde::Serialize;

use crate::checksum::TernaryDigest;
use crate::file::GGUFFile;
use crate::ternary::format_balanced_ternary_u64;
use crate::types::file_type_name;

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub version: u32,
    pub architecture: Option<String>,
    pub name: Option<String>,
    /// `general.file_type` as a quantisation name.
    pub file_type: Option<String>,
    pub tensor_count: u64,
    pub metadata_count: u64,
    pub parameter_count: u64,
    pub tensor_bytes: u64,
    /// Element type used by the most tensors; ties go to the first declared.
    pub dominant_type: Option<String>,
    pub checksum: TernaryDigest,
}

impl Summary {
    pub fn new(file: &GGUFFile) -> Self {
        let model = file.model();

        let mut type_counts: Vec<(&str, usize)> = Vec::new();
        for t in &model.tensors {
            let name = t.type_name();
            match type_counts.iter_mut().find(|(n, _)| *n == name) {
                Some((_, count)) => *count += 1,
                None => type_counts.push((name, 1)),
            }
        }
        let dominant_type = type_counts
            .iter()
            .fold(None::<(&str, usize)>, |best, &(name, count)| match best {
                Some((_, c)) if c >= count => best,
                _ => Some((name, count)),
            })
            .map(|(name, _)| name.to_string());

        Self {
            version: model.header.version,
            architecture: model.architecture().map(String::from),
            name: model.name().map(String::from),
            file_type: model
                .get("general.file_type")
                .and_then(|v| v.as_u32())
                .map(|ft| file_type_name(ft).to_string()),
            tensor_count: model.tensors.len() as u64,
            metadata_count: model.metadata.len() as u64,
            parameter_count: model.parameter_count(),
            tensor_bytes: model.tensor_bytes(),
            dominant_type,
            checksum: file.checksum(),
        }
    }

    /// Aligned text lines. With `ternary`, integers are followed by their
    /// balanced-ternary form.
    pub fn render(&self, ternary: bool) -> Rendered<'_> {
        Rendered {
            summary: self,
            ternary,
        }
    }
}

/// Text form of a [`Summary`], produced by [`Summary::render`].
pub struct Rendered<'a> {
    summary: &'a Summary,
    ternary: bool,
}

impl Rendered<'_> {
    fn num(&self, n: u64) -> String {
        if self.ternary {
            format!("{n} ({})", format_balanced_ternary_u64(n))
        } else {
            n.to_string()
        }
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;
        let arch = s.architecture.as_deref().unwrap_or("unknown");
        writeln!(f, "GGUF | {arch} | v{}", s.version)?;
        if let Some(name) = &s.name {
            writeln!(f, "Name       : {name}")?;
        }
        writeln!(f, "Parameters : {}", self.num(s.parameter_count))?;
        writeln!(f, "Tensors    : {}", self.num(s.tensor_count))?;
        let quant = s
            .file_type
            .as_deref()
            .or(s.dominant_type.as_deref())
            .unwrap_or("-");
        writeln!(f, "Quant      : {quant}")?;
        writeln!(f, "Metadata   : {} pairs", self.num(s.metadata_count))?;
        writeln!(f, "Data       : {} bytes", self.num(s.tensor_bytes))?;
        writeln!(f, "Checksum   : {}", s.checksum)
    }
}
