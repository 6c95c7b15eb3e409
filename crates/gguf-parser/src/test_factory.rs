//! Byte-level builder for synthetic GGUF files used in tests.
//!
//! Self-contained so integration tests can include it by path.

#![allow(dead_code)]

pub struct GGUFBuilder {
    version: u32,
    alignment: u64,
    kvs: Vec<u8>,
    kv_count: u64,
    tensors: Vec<u8>,
    tensor_count: u64,
    claimed_tensors: Option<u64>,
    data: Vec<u8>,
}

impl GGUFBuilder {
    pub fn new(version: u32) -> Self {
        Self {
            version,
            alignment: 32,
            kvs: Vec::new(),
            kv_count: 0,
            tensors: Vec::new(),
            tensor_count: 0,
            claimed_tensors: None,
            data: Vec::new(),
        }
    }

    fn wide(&self) -> bool {
        self.version >= 2
    }

    fn put_len(wide: bool, buf: &mut Vec<u8>, n: u64) {
        if wide {
            buf.extend_from_slice(&n.to_le_bytes());
        } else {
            buf.extend_from_slice(&(n as u32).to_le_bytes());
        }
    }

    fn put_str(wide: bool, buf: &mut Vec<u8>, s: &str) {
        Self::put_len(wide, buf, s.len() as u64);
        buf.extend_from_slice(s.as_bytes());
    }

    /// Metadata entry with a pre-encoded value payload.
    pub fn kv_raw(mut self, key: &str, tag: u32, payload: &[u8]) -> Self {
        let wide = self.wide();
        Self::put_str(wide, &mut self.kvs, key);
        self.kvs.extend_from_slice(&tag.to_le_bytes());
        self.kvs.extend_from_slice(payload);
        self.kv_count += 1;
        self
    }

    pub fn kv_u32(self, key: &str, v: u32) -> Self {
        self.kv_raw(key, 4, &v.to_le_bytes())
    }

    pub fn kv_i32(self, key: &str, v: i32) -> Self {
        self.kv_raw(key, 5, &v.to_le_bytes())
    }

    pub fn kv_u64(self, key: &str, v: u64) -> Self {
        self.kv_raw(key, 10, &v.to_le_bytes())
    }

    pub fn kv_f32(self, key: &str, v: f32) -> Self {
        self.kv_raw(key, 6, &v.to_le_bytes())
    }

    pub fn kv_bool(self, key: &str, v: bool) -> Self {
        self.kv_raw(key, 7, &[u8::from(v)])
    }

    pub fn kv_str(self, key: &str, v: &str) -> Self {
        let mut payload = Vec::new();
        Self::put_str(self.wide(), &mut payload, v);
        self.kv_raw(key, 8, &payload)
    }

    pub fn kv_str_array(self, key: &str, items: &[&str]) -> Self {
        let wide = self.wide();
        let mut payload = Vec::new();
        payload.extend_from_slice(&8u32.to_le_bytes());
        Self::put_len(wide, &mut payload, items.len() as u64);
        for item in items {
            Self::put_str(wide, &mut payload, item);
        }
        self.kv_raw(key, 9, &payload)
    }

    pub fn tensor(mut self, name: &str, dims: &[u64], type_id: u32, offset: u64) -> Self {
        let wide = self.wide();
        Self::put_str(wide, &mut self.tensors, name);
        self.tensors
            .extend_from_slice(&(dims.len() as u32).to_le_bytes());
        for &d in dims {
            Self::put_len(wide, &mut self.tensors, d);
        }
        self.tensors.extend_from_slice(&type_id.to_le_bytes());
        self.tensors.extend_from_slice(&offset.to_le_bytes());
        self.tensor_count += 1;
        self
    }

    /// Declare a tensor count different from the number of entries written.
    pub fn claim_tensors(mut self, n: u64) -> Self {
        self.claimed_tensors = Some(n);
        self
    }

    /// Padding boundary between the tensor table and the data section.
    pub fn alignment(mut self, alignment: u64) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn data(mut self, bytes: &[u8]) -> Self {
        self.data.extend_from_slice(bytes);
        self
    }

    /// Header, metadata and tensor table, without padding or data.
    pub fn structural(&self) -> Vec<u8> {
        let wide = self.wide();
        let mut out = Vec::new();
        out.extend_from_slice(b"GGUF");
        out.extend_from_slice(&self.version.to_le_bytes());
        Self::put_len(
            wide,
            &mut out,
            self.claimed_tensors.unwrap_or(self.tensor_count),
        );
        Self::put_len(wide, &mut out, self.kv_count);
        out.extend_from_slice(&self.kvs);
        out.extend_from_slice(&self.tensors);
        out
    }

    /// Complete file: structural section, zero padding, data section.
    pub fn build(self) -> Vec<u8> {
        let mut out = self.structural();
        if !self.data.is_empty() {
            while out.len() as u64 % self.alignment != 0 {
                out.push(0);
            }
            out.extend_from_slice(&self.data);
        }
        out
    }
}

/// The smallest interesting file: v3, no metadata, one 4-element F32
/// tensor `w` holding 1.0, 2.0, 3.0, 4.0.
pub fn single_f32_tensor() -> Vec<u8> {
    let data: Vec<u8> = [1.0f32, 2.0, 3.0, 4.0]
        .iter()
        .flat_map(|v| v.to_le_bytes())
        .collect();
    GGUFBuilder::new(3).tensor("w", &[4], 0, 0).data(&data).build()
}
