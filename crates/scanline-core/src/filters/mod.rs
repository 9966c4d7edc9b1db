//! Filter registry: an immutable name-to-transform lookup.
//!
//! The registry is constructed once and injected into the row fan-out
//! engine — there is no process-wide mutable filter table. Tests build
//! registries with custom filter sets to exercise dispatch and the
//! unknown-filter path.

pub mod transforms;

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{FilterKind, FilterParams};

/// A pixel transform dispatched once per image row.
///
/// Implementations receive a read-only view of the *full* source image and
/// must produce exactly the output bytes for `ctx.row` (length
/// `ctx.width * 4`). Row-local filters slice their own row out of the view;
/// blur samples neighboring rows through it.
pub trait RowTransform: Send + Sync {
    fn apply_row(&self, ctx: &RowContext<'_>, params: &FilterParams) -> Vec<u8>;
}

/// Read-only view of the source image handed to each row task.
pub struct RowContext<'a> {
    /// Full source buffer, interleaved RGBA
    pub pixels: &'a [u8],
    pub width: usize,
    pub height: usize,
    /// The row this task is responsible for
    pub row: usize,
}

impl RowContext<'_> {
    /// This task's own row within the full buffer.
    pub fn row_pixels(&self) -> &[u8] {
        let row_bytes = self.width * 4;
        &self.pixels[self.row * row_bytes..(self.row + 1) * row_bytes]
    }
}

struct Grayscale;

impl RowTransform for Grayscale {
    fn apply_row(&self, ctx: &RowContext<'_>, params: &FilterParams) -> Vec<u8> {
        transforms::grayscale(ctx.row_pixels(), ctx.width, params)
    }
}

struct Brightness;

impl RowTransform for Brightness {
    fn apply_row(&self, ctx: &RowContext<'_>, params: &FilterParams) -> Vec<u8> {
        transforms::brightness(ctx.row_pixels(), ctx.width, params)
    }
}

struct Contrast;

impl RowTransform for Contrast {
    fn apply_row(&self, ctx: &RowContext<'_>, params: &FilterParams) -> Vec<u8> {
        transforms::contrast(ctx.row_pixels(), ctx.width, params)
    }
}

struct BoxBlur;

impl RowTransform for BoxBlur {
    fn apply_row(&self, ctx: &RowContext<'_>, params: &FilterParams) -> Vec<u8> {
        transforms::blur_row(
            ctx.pixels,
            ctx.width,
            ctx.height,
            ctx.row,
            params.blur_radius as i64,
        )
    }
}

/// Immutable mapping from filter name to transform.
pub struct FilterRegistry {
    filters: HashMap<String, Arc<dyn RowTransform>>,
}

impl FilterRegistry {
    /// An empty registry; every lookup fails.
    pub fn empty() -> Self {
        Self {
            filters: HashMap::new(),
        }
    }

    /// The registry with the four built-in filters.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(FilterKind::Grayscale.as_str(), Arc::new(Grayscale));
        registry.register(FilterKind::Blur.as_str(), Arc::new(BoxBlur));
        registry.register(FilterKind::Brightness.as_str(), Arc::new(Brightness));
        registry.register(FilterKind::Contrast.as_str(), Arc::new(Contrast));
        registry
    }

    /// Add a transform under `name`. Build-time only: once the registry is
    /// shared with the engine (behind `Arc`) it can no longer change.
    pub fn register(&mut self, name: impl Into<String>, transform: Arc<dyn RowTransform>) {
        self.filters.insert(name.into(), transform);
    }

    /// Look up a transform by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn RowTransform>> {
        self.filters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
